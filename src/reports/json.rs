use crate::Result;
use crate::aggregate::{ReportModel, RunSummary};
use core::fmt::Write;
use serde_json::json;

pub fn generate<W: Write>(model: &ReportModel, summary: &RunSummary, writer: &mut W) -> Result<()> {
    let output = json!({
        "summary": summary,
        "report": model,
    });

    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
