//! Command-line interface and orchestration for cloud-runbook
//!
//! This module implements the CLI commands and wires the other modules together
//! into an end-to-end inventory run. It handles argument parsing, configuration
//! management, and the high-level workflows.
//!
//! # Commands
//!
//! - **scan**: Load the configuration and a provider recording, scan every
//!   (account, region) pair, aggregate the results and write the reports
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file for errors
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. A scan follows these steps:
//!
//! 1. Load `runbook.toml` (or `--config`) and apply command-line overrides
//! 2. Build a [`RunContext`](crate::engine::RunContext) over the replay provider
//! 3. Run the engine, with Ctrl-C wired to the run's cancellation token
//! 4. Aggregate the task reports into the report model
//! 5. Render the Markdown, JSON and console reports
//!
//! The process exits with status 1 when no scan produced any data.

mod common;
mod config;
mod host;
mod init;
mod progress_reporter;
mod run;
mod scan;
mod validate;

pub use common::{ColorMode, LogLevel};
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
pub use scan::{ScanArgs, scan};
pub use validate::{ValidateArgs, validate_config};
