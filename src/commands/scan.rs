use super::common::{ColorMode, LogLevel, init_logging};
use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::aggregate::{ReportModel, RunSummary, aggregate};
use crate::engine::{self, RunContext};
use crate::provider::{CloudApi, CredentialSource, ReplayProvider};
use crate::reports::{generate_console, generate_json, generate_markdown};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Args;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::fs;
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "      scan";

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Recorded provider responses to replay (TOML, YAML or JSON)
    #[arg(long, value_name = "PATH")]
    pub replay: Utf8PathBuf,

    /// Path to configuration file (default is `runbook.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Scan only this account; may be repeated
    #[arg(long = "account", value_name = "ID", help_heading = "Overrides")]
    pub accounts: Vec<String>,

    /// Scan this region instead of the configured ones; may be repeated, the first is the home region
    #[arg(long = "region", value_name = "REGION", help_heading = "Overrides")]
    pub regions: Vec<String>,

    /// Maximum number of scans running at once
    #[arg(long, value_name = "N", help_heading = "Overrides")]
    pub max_concurrency: Option<usize>,

    /// Wall-clock budget for one scan, in seconds
    #[arg(long, value_name = "SECS", help_heading = "Overrides")]
    pub timeout: Option<u64>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Write the runbook document to a Markdown file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub markdown: Option<Utf8PathBuf>,

    /// Write the inventory to a JSON file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Print the summary to the console. If omitted, the summary is printed only when no report file is written.
    #[arg(long, help_heading = "Report Output")]
    pub console: bool,
}

impl ScanArgs {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(Utf8Path::new("."), self.config.as_ref())?;

        if !self.accounts.is_empty() {
            config.override_accounts(&self.accounts)?;
        }

        if !self.regions.is_empty() {
            config.override_regions(&self.regions)?;
        }

        if let Some(max_concurrency) = self.max_concurrency {
            config.max_concurrency = max_concurrency;
        }

        if let Some(timeout) = self.timeout {
            config.task_timeout_secs = timeout;
        }

        config.validate_for_scan()?;
        Ok(config)
    }
}

/// Scan every configured (account, region) pair and write the requested reports.
///
/// # Errors
///
/// Returns an error if the configuration or recording cannot be loaded, a report cannot be
/// written, or no scan produced any data.
pub async fn scan<H: Host>(host: &mut H, args: &ScanArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = args.load_config()?;
    let registry = config.registry()?;
    let provider = Arc::new(ReplayProvider::load(&args.replay)?);

    let delay = if args.log_level == LogLevel::None {
        Duration::from_millis(300)
    } else {
        Duration::from_hours(365 * 24)
    };

    let use_colors_for_progress = args.color.use_colors(std::io::stderr().is_terminal());
    let progress = Arc::new(ProgressReporter::new(delay, use_colors_for_progress));

    let cancel = CancellationToken::new();
    let credentials = Arc::clone(&provider) as Arc<dyn CredentialSource>;
    let api: Arc<dyn CloudApi> = provider;
    let ctx = RunContext::new(credentials, api, registry, config.settings())
        .with_cancellation(cancel.clone())
        .with_progress(progress, use_colors_for_progress);

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!(target: LOG_TARGET, "Interrupted, cancelling the scan");
            cancel.cancel();
        }
    });

    let reports = engine::run(&ctx, &config.accounts, &config.regions).await;
    interrupt.abort();

    let (model, summary) = aggregate(&ctx.registry, &reports, Utc::now());

    write_reports(host, args, &config, &model, &summary)?;

    if !summary.any_succeeded() {
        let _ = writeln!(
            host.error(),
            "No scan produced any data: {} of {} scan(s) failed, timed out or were cancelled",
            summary.tasks_failed + summary.tasks_timed_out + summary.tasks_cancelled,
            summary.tasks_total
        );
        host.exit(1);
        bail!("no scan produced any data");
    }

    Ok(())
}

fn write_reports<H: Host>(host: &mut H, args: &ScanArgs, config: &Config, model: &ReportModel, summary: &RunSummary) -> Result<()> {
    if let Some(path) = &args.markdown {
        let mut output = String::new();
        generate_markdown(model, summary, config.max_table_rows, &mut output)?;
        fs::write(path, output).into_app_err_with(|| format!("writing Markdown report to {path}"))?;
        log::info!(target: LOG_TARGET, "Wrote Markdown report to {path}");
    }

    if let Some(path) = &args.json {
        let mut output = String::new();
        generate_json(model, summary, &mut output)?;
        fs::write(path, output).into_app_err_with(|| format!("writing JSON report to {path}"))?;
        log::info!(target: LOG_TARGET, "Wrote JSON report to {path}");
    }

    let generating_reports = args.markdown.is_some() || args.json.is_some();
    if args.console || !generating_reports {
        let use_colors = args.color.use_colors(std::io::stdout().is_terminal());
        let mut output = String::new();
        generate_console(model, summary, use_colors, &mut output)?;
        let _ = write!(host.output(), "{output}");
    }

    Ok(())
}
