//! FILENAME: core/pivot-engine/src/aggregate.rs
//! Aggregation Engine - computes formatted aggregate strings.
//!
//! Two modes:
//! - `aggregate`: directly over the raw records of a cell.
//! - `rollup`: over already-computed child cell strings. Rollups always SUM
//!   the children, whatever the configured aggregation, so an `avg` subtotal
//!   is the sum of the child averages and a `max` subtotal the sum of the
//!   child maxima.
//!
//! An empty contributing set renders as `""`, never as zero. A sum of zero,
//! direct or rolled up, renders as `""` as well.

use records::{format_fixed, format_number, parse_number, Record};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::definition::{AggregationType, ValueField};
use crate::hierarchy::RecordId;

/// Formatted aggregates of one cell, keyed by `field_agg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateValues {
    values: FxHashMap<String, String>,
}

impl AggregateValues {
    pub fn new() -> Self {
        AggregateValues::default()
    }

    /// The formatted value for `agg_key`, or `""` when there is none.
    pub fn get(&self, agg_key: &str) -> &str {
        self.values.get(agg_key).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, agg_key: String, value: String) {
        self.values.insert(agg_key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Aggregates `members` of `records` for every value field.
///
/// Returns an empty map when there are no members or no value fields.
pub fn aggregate(records: &[Record], members: &[RecordId], value_fields: &[ValueField]) -> AggregateValues {
    let mut out = AggregateValues::new();
    if members.is_empty() {
        return out;
    }

    for vf in value_fields {
        let numbers: Vec<f64> = members
            .iter()
            .filter_map(|&id| records[id].number(&vf.field))
            .collect();

        let value = if numbers.is_empty() {
            match vf.aggregation {
                // Nothing numeric: count the members that hold any value.
                AggregationType::Count => members
                    .iter()
                    .filter(|&&id| records[id].has_value(&vf.field))
                    .count()
                    .to_string(),
                _ => String::new(),
            }
        } else {
            compute(vf.aggregation, &numbers)
        };

        out.insert(vf.agg_key(), value);
    }
    out
}

/// Applies one aggregation to a non-empty numeric set.
fn compute(aggregation: AggregationType, numbers: &[f64]) -> String {
    match aggregation {
        AggregationType::Sum => {
            let sum: f64 = numbers.iter().sum();
            // A zero sum renders blank, same as no data.
            if sum == 0.0 {
                String::new()
            } else {
                format_number(sum)
            }
        }
        AggregationType::Average => {
            let sum: f64 = numbers.iter().sum();
            format_fixed(sum / numbers.len() as f64, 2)
        }
        AggregationType::Count => numbers.len().to_string(),
        AggregationType::Max => format_number(numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        AggregationType::Min => format_number(numbers.iter().copied().fold(f64::INFINITY, f64::min)),
    }
}

/// Counts the records of a cell; `""` when there are none.
pub fn count_records(members: &[RecordId]) -> String {
    if members.is_empty() {
        String::new()
    } else {
        members.len().to_string()
    }
}

/// Sums already-formatted child values. Blank or non-numeric children are
/// skipped. Renders like a direct sum: `""` when nothing contributes or the
/// total is zero.
pub fn rollup<'a, I>(child_values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let numbers: Vec<f64> = child_values.into_iter().filter_map(parse_number).collect();
    if numbers.is_empty() {
        String::new()
    } else {
        compute(AggregationType::Sum, &numbers)
    }
}
