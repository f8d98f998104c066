use super::common::{self, column_header};
use crate::Result;
use crate::aggregate::{ReportModel, ReportSection, RunSummary, SectionEntry};
use crate::inventory::{CollectorResult, Payload};
use core::fmt::Write;

const TITLE: &str = "Cloud Runbook";
const SUMMARY_HEADING: &str = "Run Summary";
const SCANS_HEADING: &str = "Scan Status";

/// Render the runbook document.
///
/// `max_table_rows` caps the rows shown per table; zero means no cap.
pub fn generate<W: Write>(model: &ReportModel, summary: &RunSummary, max_table_rows: usize, writer: &mut W) -> Result<()> {
    write_cover(model, summary, writer)?;
    write_contents(model, writer)?;
    write_summary(summary, writer)?;
    write_scans(model, writer)?;

    for (index, section) in model.sections.iter().enumerate() {
        write_section(index + 1, section, max_table_rows, writer)?;
    }

    Ok(())
}

fn write_cover<W: Write>(model: &ReportModel, summary: &RunSummary, writer: &mut W) -> Result<()> {
    writeln!(writer, "# {TITLE}")?;
    writeln!(writer)?;
    writeln!(writer, "**Generated:** {}", summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(writer)?;

    writeln!(writer, "**Accounts:**")?;
    writeln!(writer)?;
    for account in &model.accounts {
        writeln!(writer, "- {account}")?;
    }
    writeln!(writer)?;

    let regions: Vec<_> = model.regions.iter().map(ToString::to_string).collect();
    writeln!(writer, "**Regions:** {}", regions.join(", "))?;
    writeln!(writer)?;
    Ok(())
}

fn write_contents<W: Write>(model: &ReportModel, writer: &mut W) -> Result<()> {
    writeln!(writer, "## Contents")?;
    writeln!(writer)?;
    writeln!(writer, "- [{SUMMARY_HEADING}](#{})", anchor(SUMMARY_HEADING))?;
    writeln!(writer, "- [{SCANS_HEADING}](#{})", anchor(SCANS_HEADING))?;

    for (index, section) in model.sections.iter().enumerate() {
        let heading = section_heading(index + 1, section);
        writeln!(writer, "- [{heading}](#{})", anchor(&heading))?;
    }

    writeln!(writer)?;
    Ok(())
}

fn write_summary<W: Write>(summary: &RunSummary, writer: &mut W) -> Result<()> {
    writeln!(writer, "## {SUMMARY_HEADING}")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "| --- | ---: |")?;

    let rows = [
        ("Accounts scanned", summary.accounts_scanned),
        ("Regions scanned", summary.regions_scanned),
        ("Tasks planned", summary.tasks_total),
        ("Tasks attempted", summary.tasks_attempted),
        ("Tasks succeeded", summary.tasks_succeeded),
        ("Tasks partially failed", summary.tasks_partially_failed),
        ("Tasks failed", summary.tasks_failed),
        ("Tasks timed out", summary.tasks_timed_out),
        ("Tasks cancelled", summary.tasks_cancelled),
    ];

    for (label, value) in rows {
        writeln!(writer, "| {label} | {value} |")?;
    }

    for (kind, count) in &summary.failures_by_kind {
        writeln!(writer, "| {kind} failures | {count} |")?;
    }

    writeln!(writer)?;
    Ok(())
}

fn write_scans<W: Write>(model: &ReportModel, writer: &mut W) -> Result<()> {
    writeln!(writer, "## {SCANS_HEADING}")?;
    writeln!(writer)?;
    writeln!(writer, "| Account | Region | Status |")?;
    writeln!(writer, "| --- | --- | --- |")?;

    for scan in &model.scans {
        writeln!(
            writer,
            "| {} | {} | {} |",
            escape_cell(&scan.account.to_string()),
            scan.region,
            escape_cell(&common::describe_scan(scan))
        )?;
    }

    writeln!(writer)?;
    Ok(())
}

fn write_section<W: Write>(number: usize, section: &ReportSection, max_table_rows: usize, writer: &mut W) -> Result<()> {
    writeln!(writer, "## {}", section_heading(number, section))?;
    writeln!(writer)?;
    writeln!(writer, "{}", section.description)?;
    writeln!(writer)?;

    for entry in &section.entries {
        write_entry(entry, max_table_rows, writer)?;
    }

    Ok(())
}

fn write_entry<W: Write>(entry: &SectionEntry, max_table_rows: usize, writer: &mut W) -> Result<()> {
    writeln!(writer, "### {} / {}", entry.account, entry.region)?;
    writeln!(writer)?;

    match &entry.result {
        CollectorResult::Found(payload) => write_payload(payload, max_table_rows, writer)?,
        CollectorResult::Failed(failure) => {
            writeln!(writer, "**Error ({})**: {}", failure.kind, failure.message)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

fn write_payload<W: Write>(payload: &Payload, max_table_rows: usize, writer: &mut W) -> Result<()> {
    if payload.is_empty() {
        writeln!(writer, "_No resources found._")?;
        writeln!(writer)?;
    } else {
        let headers: Vec<_> = payload.columns.iter().map(|c| column_header(c)).collect();
        writeln!(writer, "| {} |", headers.join(" | "))?;
        writeln!(writer, "|{}", " --- |".repeat(headers.len()))?;

        let shown = if max_table_rows == 0 {
            payload.len()
        } else {
            payload.len().min(max_table_rows)
        };

        for record in payload.records.iter().take(shown) {
            let cells: Vec<_> = payload
                .columns
                .iter()
                .map(|column| escape_cell(&common::format_field(record.get(column).flatten())))
                .collect();
            writeln!(writer, "| {} |", cells.join(" | "))?;
        }

        writeln!(writer)?;

        let hidden = payload.len() - shown;
        if hidden > 0 {
            writeln!(writer, "_… and {hidden} more_")?;
            writeln!(writer)?;
        }
    }

    for note in &payload.notes {
        writeln!(writer, "> **Warning:** {note}")?;
        writeln!(writer)?;
    }

    Ok(())
}

fn section_heading(number: usize, section: &ReportSection) -> String {
    format!("{number}. {}", section.title)
}

/// GitHub-style heading anchor: lowercase, spaces become dashes, punctuation is dropped.
fn anchor(heading: &str) -> String {
    heading
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('-'),
            '_' => Some('_'),
            c if c.is_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::{sample, topics};

    fn render(max_table_rows: usize) -> String {
        let (model, summary) = sample();
        let mut output = String::new();
        generate(&model, &summary, max_table_rows, &mut output).unwrap();
        output
    }

    #[test]
    fn test_cover_lists_accounts_and_time() {
        let output = render(10);
        assert!(output.starts_with("# Cloud Runbook\n"));
        assert!(output.contains("**Generated:** 2025-01-02 03:04:05 UTC"));
        assert!(output.contains("- 111111111111 (prod)\n"));
        assert!(output.contains("- 222222222222\n"));
        assert!(output.contains("**Regions:** us-east-1"));
    }

    #[test]
    fn test_contents_link_numbered_sections() {
        let output = render(10);
        assert!(output.contains("- [Run Summary](#run-summary)"));
        assert!(output.contains("- [1. Messaging Topics](#1-messaging-topics)"));
        assert!(output.contains("- [2. Serverless Functions](#2-serverless-functions)"));
        assert!(output.contains("## 1. Messaging Topics"));
    }

    #[test]
    fn test_sections_follow_model_order() {
        let output = render(10);
        let topics = output.find("## 1. Messaging Topics").unwrap();
        let functions = output.find("## 2. Serverless Functions").unwrap();
        assert!(topics < functions);
    }

    #[test]
    fn test_summary_table() {
        let output = render(10);
        assert!(output.contains("| Tasks succeeded | 1 |"));
        assert!(output.contains("| Tasks failed | 1 |"));
        assert!(output.contains("| AuthFailure failures | 2 |"));
        assert!(output.contains("| 222222222222 | us-east-1 | Failed (AuthFailure): assuming role: AccessDenied: not allowed |"));
    }

    #[test]
    fn test_records_render_as_table() {
        let output = render(10);
        assert!(output.contains("| Name | Arn |\n| --- | --- |\n| topic-00 | n/a |"));
        assert!(!output.contains("more_"));
    }

    #[test]
    fn test_rows_are_capped() {
        let output = render(2);
        assert!(output.contains("| topic-01 | n/a |"));
        assert!(!output.contains("topic-02"));
        assert!(output.contains("_… and 1 more_"));
    }

    #[test]
    fn test_zero_means_unlimited() {
        let (mut model, summary) = sample();
        model.sections[0].entries[0].result = topics(40);
        let mut output = String::new();
        generate(&model, &summary, 0, &mut output).unwrap();
        assert!(output.contains("topic-39"));
    }

    #[test]
    fn test_failures_and_notes() {
        let output = render(10);
        assert!(output.contains("### 222222222222 / us-east-1\n\n**Error (AuthFailure)**: assuming role: AccessDenied: not allowed"));
        assert!(output.contains("_No resources found._\n\n> **Warning:** one function could not be read"));
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("3. Control Tower"), "3-control-tower");
        assert_eq!(anchor("Scan Status"), "scan-status");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
