//! Report generation
//!
//! Renderers over the aggregated [`ReportModel`](crate::aggregate::ReportModel):
//!
//! - **Markdown**: the runbook document, with a table of contents and one section per collector
//! - **JSON**: the summary and report model, for machine consumption
//! - **Console**: run counters and per-scan status, optionally colored

mod common;
mod console;
mod json;
mod markdown;

#[cfg(test)]
mod test_support;

pub use console::generate as generate_console;
pub use json::generate as generate_json;
pub use markdown::generate as generate_markdown;
