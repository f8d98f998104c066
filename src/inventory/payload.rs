use super::{CollectorFailure, Record, RecordShape};
use serde::Serialize;
use std::borrow::Cow;

/// The data a collector gathered for one (account, region).
///
/// Records keep the order the collector produced them in. `notes` carries warnings about partial
/// collection, for example a follow-up call that failed for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    pub columns: Vec<Cow<'static, str>>,
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Payload {
    /// Build a payload from typed records; the columns come from the shape.
    ///
    /// # Errors
    ///
    /// Returns an `Unknown` failure if any record does not match its declared shape.
    pub fn from_shapes<R: RecordShape>(shapes: impl IntoIterator<Item = R>) -> Result<Self, CollectorFailure> {
        let records = shapes.into_iter().map(Record::from_shape).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            columns: R::COLUMNS.iter().map(|&c| Cow::Borrowed(c)).collect(),
            records,
            notes: Vec::new(),
        })
    }

    /// Build a payload from free-form records.
    ///
    /// The columns are the union of the field names, in first-seen order.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<Cow<'static, str>> = Vec::new();
        for record in &records {
            for name in record.field_names() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        Self {
            columns,
            records,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.notes.extend(notes);
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::FieldValue;

    #[test]
    fn test_from_records_unions_columns_in_first_seen_order() {
        let payload = Payload::from_records(vec![
            Record::new().with("status", Some("Active".into())),
            Record::new()
                .with("landing_zones", Some(FieldValue::UInt(1)))
                .with("status", Some("Active".into())),
        ]);

        assert_eq!(payload.columns, vec!["status", "landing_zones"]);
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_notes_accumulate() {
        let payload = Payload::default()
            .with_note("first")
            .with_notes(vec!["second".to_string()]);
        assert_eq!(payload.notes, vec!["first", "second"]);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_notes_skipped_when_empty() {
        let json = serde_json::to_value(Payload::default()).unwrap();
        assert!(json.get("notes").is_none());
    }
}
