use super::common;
use crate::Result;
use crate::aggregate::{PairStatus, ReportModel, RunSummary, ScanStatus};
use crate::inventory::FailureKind;
use core::fmt::Write;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

pub fn generate<W: Write>(model: &ReportModel, summary: &RunSummary, use_colors: bool, writer: &mut W) -> Result<()> {
    write_heading("Run Summary", use_colors, writer)?;

    let counters = [
        ("Accounts scanned", summary.accounts_scanned),
        ("Regions scanned", summary.regions_scanned),
        ("Tasks planned", summary.tasks_total),
        ("Tasks attempted", summary.tasks_attempted),
        ("Succeeded", summary.tasks_succeeded),
        ("Partially failed", summary.tasks_partially_failed),
        ("Failed", summary.tasks_failed),
        ("Timed out", summary.tasks_timed_out),
        ("Cancelled", summary.tasks_cancelled),
    ];

    let label_width = counters.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in counters {
        writeln!(writer, "  {label:<label_width$} : {value}")?;
    }

    if !summary.failures_by_kind.is_empty() {
        writeln!(writer)?;
        write_heading("Collector Failures", use_colors, writer)?;

        let kind_width = summary.failures_by_kind.keys().map(|k| k.to_string().len()).max().unwrap_or(0);
        for (kind, count) in &summary.failures_by_kind {
            writeln!(writer, "  {:<kind_width$} : {count}", kind.to_string())?;
        }
    }

    writeln!(writer)?;
    write_heading("Scan Status", use_colors, writer)?;

    let account_width = model.scans.iter().map(|s| s.account.to_string().len()).max().unwrap_or(0);
    let region_width = model.scans.iter().map(|s| s.region.as_str().len()).max().unwrap_or(0);

    // "  " + account + "  " + region + "  "
    let status_indent = 2 + account_width + 2 + region_width + 2;
    let term_width = get_terminal_width();

    for scan in &model.scans {
        let lines = wrap_text(&common::describe_scan(scan), term_width, status_indent);
        let Some((first, rest)) = lines.split_first() else {
            continue;
        };

        writeln!(
            writer,
            "  {:<account_width$}  {:<region_width$}  {}",
            scan.account.to_string(),
            scan.region.as_str(),
            colorize(scan, first, use_colors)
        )?;

        for line in rest {
            writeln!(writer, "{line}")?;
        }
    }

    writeln!(writer, "  Generated {}", summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    Ok(())
}

fn write_heading<W: Write>(heading: &str, use_colors: bool, writer: &mut W) -> Result<()> {
    if use_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{heading}")?;
    }
    Ok(())
}

fn colorize(scan: &PairStatus, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }

    match scan.status {
        ScanStatus::Complete => text.green().to_string(),
        ScanStatus::Partial => text.yellow().to_string(),
        ScanStatus::Failed(FailureKind::Cancelled) => text.dimmed().to_string(),
        ScanStatus::Failed(_) | ScanStatus::TimedOut => text.red().to_string(),
    }
}

fn get_terminal_width() -> usize {
    terminal_size().map_or(80, |(Width(w), _)| w as usize)
}

/// Word-wrap text to fit within a given width, with indentation for continuation lines
fn wrap_text(text: &str, width: usize, indent: usize) -> Vec<String> {
    if width <= indent {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut is_first_line = true;

    for word in text.split_whitespace() {
        let separator_len = usize::from(!current_line.is_empty());

        // the first line starts after the account and region columns too
        let line_width = indent + current_line.len();

        if !current_line.is_empty() && line_width + separator_len + word.len() > width {
            if is_first_line {
                lines.push(core::mem::take(&mut current_line));
                is_first_line = false;
            } else {
                lines.push(format!("{:indent$}{}", "", core::mem::take(&mut current_line)));
            }
        } else if !current_line.is_empty() {
            current_line.push(' ');
        }

        current_line.push_str(word);
    }

    if is_first_line {
        lines.push(current_line);
    } else if !current_line.is_empty() {
        lines.push(format!("{:indent$}{current_line}", ""));
    }

    lines
}
