use super::{CollectorFailure, FieldValue};
use serde::{Serialize, Serializer};
use std::borrow::Cow;

/// A typed record that knows its own closed set of fields.
///
/// Collectors define one such type per resource kind. [`Record::from_shape`] checks that
/// the values produced line up with [`RecordShape::COLUMNS`].
pub trait RecordShape {
    /// Field names, in display order.
    const COLUMNS: &'static [&'static str];

    /// Field values in the same order as [`Self::COLUMNS`]; `None` marks an absent value.
    fn into_values(self) -> Vec<Option<FieldValue>>;
}

/// An ordered mapping of field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(Cow<'static, str>, Option<FieldValue>)>,
}

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style append of one field.
    #[must_use]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: Option<FieldValue>) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Build a record from a typed shape.
    ///
    /// # Errors
    ///
    /// Returns an `Unknown` failure if the shape produced a different number of values than it has columns.
    pub fn from_shape<R: RecordShape>(shape: R) -> Result<Self, CollectorFailure> {
        let values = shape.into_values();
        if values.len() != R::COLUMNS.len() {
            return Err(CollectorFailure::unknown(format!(
                "record shape declares {} columns but produced {} values",
                R::COLUMNS.len(),
                values.len()
            )));
        }

        Ok(Self {
            fields: R::COLUMNS.iter().map(|&name| Cow::Borrowed(name)).zip(values).collect(),
        })
    }

    /// Look up a field by name. The outer `Option` is `None` when the field does not exist.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Option<&FieldValue>> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields.iter().map(|(n, v)| (n.as_ref(), v.as_ref()))
    }

    pub(super) fn field_names(&self) -> impl Iterator<Item = &Cow<'static, str>> {
        self.fields.iter().map(|(n, _)| n)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(n, v)| (n.as_ref(), v)))
    }
}
