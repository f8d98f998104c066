//! Command dispatch logic for cloud-runbook

use super::{InitArgs, ScanArgs, ValidateArgs, init_config, scan, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "cloud-runbook", author, version, long_about = None)]
#[command(about = "Inventory cloud resources across accounts and regions")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: RunbookSubcommand,
}

#[derive(Subcommand, Debug)]
enum RunbookSubcommand {
    /// Scan every configured account and region and generate reports
    Scan(Box<ScanArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        RunbookSubcommand::Scan(scan_args) => scan(host, scan_args).await,
        RunbookSubcommand::Init(init_args) => init_config(host, init_args),
        RunbookSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
