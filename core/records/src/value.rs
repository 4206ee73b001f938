//! FILENAME: core/records/src/value.rs
//! PURPOSE: The scalar held by one field of one record.

use serde::{Deserialize, Serialize};

use crate::number::{format_number, parse_number};

/// A single field value: text, a number, or nothing at all.
///
/// Deserializes from plain JSON scalars (`"East"`, `10`, `null`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Returns the text form used for grouping, or `None` when absent.
    /// An empty string is still a value.
    pub fn display_value(&self) -> Option<String> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    /// Coerces the value to a number. Text is parsed by numeric prefix;
    /// NaN never counts as a number.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Empty => None,
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_number(s),
        };
        n.filter(|n| !n.is_nan())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Empty, Into::into)
    }
}
