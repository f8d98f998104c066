//! Common utilities shared across report generators.

use crate::aggregate::{PairStatus, ScanStatus};
use crate::inventory::{FailureKind, FieldValue};

/// Placeholder for fields that have no value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Format an optional field value for display.
pub fn format_field(value: Option<&FieldValue>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), ToString::to_string)
}

/// Describe how a scan ended, including the failure kind and message when there is one.
pub fn describe_scan(scan: &PairStatus) -> String {
    let mut text = match scan.status {
        ScanStatus::Failed(FailureKind::Cancelled) | ScanStatus::Complete | ScanStatus::Partial | ScanStatus::TimedOut => {
            scan.status.label().to_string()
        }
        ScanStatus::Failed(kind) => format!("Failed ({kind})"),
    };

    if let Some(message) = &scan.message {
        text.push_str(": ");
        text.push_str(message);
    }

    text
}

/// Turn a column name such as `instance_id` into a header such as `Instance Id`.
pub fn column_header(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                let mut header = first.to_uppercase().to_string();
                header.push_str(chars.as_str());
                header
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
