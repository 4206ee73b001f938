//! FILENAME: core/pivot-engine/src/span.rs
//! Row Spans - merged-cell runs for the row-label columns of one page.
//!
//! For each row level, consecutive rows that share the same path down to
//! that level form a run. The first row of a run owns the merged cell and
//! carries the span length; every other row of the run renders nothing at
//! that level. A run stops at a subtotal closing that level (or an outer
//! one), at a change of any outer value, or at a change of its own value.
//! When the row right after a run is the subtotal closing exactly that
//! level, the run grows by one to merge into it.
//!
//! Spans are page-local and must be recomputed whenever the page changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::flatten::FlatRow;

/// A merged cell: where it starts, how many rows it covers, what it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpanEntry {
    pub start_index: usize,
    pub span_length: usize,
    pub display_value: String,
}

/// Per-level span runs keyed by page-local start index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpanMap {
    levels: Vec<BTreeMap<usize, RowSpanEntry>>,
}

impl RowSpanMap {
    /// Runs of `level`, keyed by start index.
    pub fn level(&self, level: usize) -> Option<&BTreeMap<usize, RowSpanEntry>> {
        self.levels.get(level)
    }

    /// The merged cell starting at `index` on `level`, if one starts there.
    pub fn get(&self, level: usize, index: usize) -> Option<&RowSpanEntry> {
        self.levels.get(level).and_then(|runs| runs.get(&index))
    }

    /// Whether `index` is covered by a run on `level` without starting it.
    pub fn is_covered(&self, level: usize, index: usize) -> bool {
        self.levels.get(level).is_some_and(|runs| {
            runs.range(..index)
                .next_back()
                .is_some_and(|(_, run)| index < run.start_index + run.span_length)
        })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Computes the span runs of `page_rows` for `row_field_count` levels.
pub fn compute_row_spans(page_rows: &[FlatRow], row_field_count: usize) -> RowSpanMap {
    if page_rows.is_empty() || row_field_count == 0 {
        return RowSpanMap::default();
    }

    let levels = (0..row_field_count)
        .map(|level| level_runs(page_rows, level))
        .collect();
    RowSpanMap { levels }
}

fn level_runs(rows: &[FlatRow], level: usize) -> BTreeMap<usize, RowSpanEntry> {
    let mut runs = BTreeMap::new();
    let mut i = 0;

    while i < rows.len() {
        let current = &rows[i];
        if current.closes_level_at_or_above(level) {
            i += 1;
            continue;
        }

        let value = current.value_at(level);
        let mut span = 1;
        let mut j = i + 1;
        while j < rows.len() {
            let next = &rows[j];
            if next.closes_level_at_or_above(level) {
                break;
            }
            let same_parent = (0..level).all(|k| next.value_at(k) == current.value_at(k));
            if !same_parent || next.value_at(level) != value {
                break;
            }
            span += 1;
            j += 1;
        }

        if rows
            .get(j)
            .is_some_and(|r| r.is_subtotal && r.subtotal_level == Some(level))
        {
            span += 1;
        }

        runs.insert(
            i,
            RowSpanEntry {
                start_index: i,
                span_length: span,
                display_value: value.unwrap_or_default().to_string(),
            },
        );
        i = j;
    }

    log::trace!("level {}: {} span runs", level, runs.len());
    runs
}
