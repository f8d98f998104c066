//! Inventory cloud resources across accounts and regions and assemble a runbook.
//!
//! # Quick Start
//!
//! ```bash
//! cloud-runbook init
//! cloud-runbook scan --replay recording.json --markdown runbook.md
//! ```
//!
//! See `cloud-runbook --help` for every option.

use cloud_runbook::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that talks to the real process streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
