//! cloud-runbook crate
//!
//! This crate is an implementation detail of the `cloud-runbook` tool. It inventories resources across
//! an account × region matrix, isolates every probe failure as a typed value, and aggregates the partial
//! results into one ordered report model.
//!
//! # Module Organization
//!
//! - [`inventory`]: Data model shared by every other module
//! - [`provider`]: Interfaces to the cloud provider and the replay backend
//! - [`collectors`]: The ordered registry of resource probes
//! - [`engine`]: Credential resolution and bounded-parallel task execution
//! - [`aggregate`]: Regrouping task output into the report model
//! - [`reports`]: Document, JSON and console renderers
//! - [`commands`]: Command-line interface and orchestration

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod aggregate;

#[doc(hidden)]
pub mod collectors;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod engine;

#[doc(hidden)]
pub mod inventory;

#[doc(hidden)]
pub mod provider;

#[doc(hidden)]
pub mod reports;

pub use crate::commands::{Host, run};
