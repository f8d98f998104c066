//! Regrouping task output into the report model
//!
//! [`aggregate`] is a pure function over the settled task reports. It builds one
//! [`ReportSection`] per registered collector, in registry order, with one entry per
//! (account, region) in plan order. Slots that have no collector result are filled from the
//! task's terminal state so that gaps in the scan stay visible in the report.

mod aggregator;
mod report_model;
mod run_summary;

pub use aggregator::aggregate;
pub use report_model::{PairStatus, ReportModel, ReportSection, ScanStatus, SectionEntry};
pub use run_summary::RunSummary;
