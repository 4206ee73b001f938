//! FILENAME: core/records/src/record.rs
//! PURPOSE: One immutable input row: field name -> scalar.
//! CONTEXT: Supplied wholesale by the caller and never mutated by the
//! pivot engine. Missing fields read as `FieldValue::Empty`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

static EMPTY: FieldValue = FieldValue::Empty;

/// A flat record keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: FxHashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Returns the value of `field`, or `Empty` when the field is absent.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&EMPTY)
    }

    /// Returns true when the field exists and is not empty.
    pub fn has_value(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Numeric view of a field (see [`FieldValue::as_number`]).
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).as_number()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}
