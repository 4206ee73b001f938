//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that transforms records into a renderable view.
//!
//! This module takes a PivotDefinition (configuration), the records and a
//! page request, and produces a PivotView (everything a renderer needs).
//!
//! Algorithm:
//! 1. Resolve the configuration shape once
//! 2. Build the row and column group hierarchies
//! 3. Flatten the row hierarchy, inserting subtotal rows after their groups
//! 4. Derive the final columns from the leaf column keys and value fields
//! 5. Aggregate every row/column intersection, rolling subtotals up
//! 6. Sum the grand total over the data rows
//! 7. Slice the requested page and compute its row spans
//!
//! Every stage is a pure function of its inputs; calling `calculate_pivot`
//! again with the same arguments yields the same view.

use std::ops::Range;

use records::Record;
use serde::Serialize;

use crate::columns::{build_final_columns, header_row_count, ColumnHierarchy, FinalColumn};
use crate::definition::{PageRequest, PivotDefinition, PivotShape};
use crate::flatten::{flatten_rows, FlatRow};
use crate::hierarchy::Hierarchy;
use crate::paginate::{leaf_row_count, page_bounds, page_count};
use crate::pivot_data::{compute_pivot_data, grand_total, GrandTotal, PivotData};
use crate::span::{compute_row_spans, RowSpanMap};

// ============================================================================
// PIVOT VIEW
// ============================================================================

/// The computed pivot table for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PivotView {
    pub shape: PivotShape,

    pub definition: PivotDefinition,

    /// Every flattened row, across all pages.
    pub rows: Vec<FlatRow>,

    pub page: PageRequest,

    /// Index range of the current page within `rows`; `None` when the page
    /// is empty.
    pub page_range: Option<Range<usize>>,

    /// Spans of the current page, indexed relative to the page.
    pub row_spans: RowSpanMap,

    pub columns: ColumnHierarchy,

    pub final_columns: Vec<FinalColumn>,

    pub header_row_count: usize,

    pub data: PivotData,

    pub grand_total: Option<GrandTotal>,

    /// Number of non-subtotal rows.
    pub total_leaf_rows: usize,

    pub page_count: usize,
}

impl PivotView {
    /// The rows of the current page.
    pub fn page_rows(&self) -> &[FlatRow] {
        match &self.page_range {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// The value `column` shows on the flat row at `row`.
    pub fn cell(&self, row: usize, column: &FinalColumn) -> &str {
        self.data.cell(row, column)
    }

    /// The value `column` shows on the `index`-th row of the current page.
    pub fn page_cell(&self, index: usize, column: &FinalColumn) -> &str {
        match &self.page_range {
            Some(range) if index < range.len() => self.data.cell(range.start + index, column),
            _ => "",
        }
    }

    /// The grand-total value of the final column at `column`, `""` without
    /// a grand total.
    pub fn grand_total_cell(&self, column: usize) -> &str {
        self.grand_total
            .as_ref()
            .map(|total| total.get(column))
            .unwrap_or("")
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

struct PivotCalculator<'a> {
    records: &'a [Record],
    definition: &'a PivotDefinition,
    page: PageRequest,
    shape: PivotShape,
}

impl<'a> PivotCalculator<'a> {
    fn new(records: &'a [Record], definition: &'a PivotDefinition, page: PageRequest) -> Self {
        PivotCalculator {
            records,
            definition,
            page,
            shape: definition.shape(),
        }
    }

    fn calculate(&self) -> PivotView {
        let definition = self.definition;

        let row_tree = match self.shape {
            PivotShape::Grouped => Hierarchy::build(self.records, &definition.row_fields),
            _ => Hierarchy::default(),
        };
        let rows = flatten_rows(self.shape, &row_tree, self.records.len());

        let columns = ColumnHierarchy::build(
            self.records,
            &definition.column_fields,
            definition.value_fields.len(),
        );
        let final_columns = build_final_columns(definition, &columns.leaf_keys());

        let data = compute_pivot_data(self.records, definition, &rows, &columns, &final_columns);
        let grand_total = grand_total(self.shape, definition, &rows, &final_columns, &data);

        let page_range = page_bounds(&rows, self.page.page, self.page.page_size);
        let row_spans = match &page_range {
            Some(range) => compute_row_spans(&rows[range.clone()], definition.row_fields.len()),
            None => RowSpanMap::default(),
        };

        let total_leaf_rows = leaf_row_count(&rows);
        let pages = page_count(&rows, self.page.page_size);

        log::debug!(
            "calculate_pivot: shape={:?} records={} flat_rows={} leaf_rows={} final_columns={} page={}/{} range={:?}",
            self.shape,
            self.records.len(),
            rows.len(),
            total_leaf_rows,
            final_columns.len(),
            self.page.page,
            pages,
            page_range
        );

        PivotView {
            shape: self.shape,
            definition: definition.clone(),
            rows,
            page: self.page,
            page_range,
            row_spans,
            header_row_count: header_row_count(definition),
            columns,
            final_columns,
            data,
            grand_total,
            total_leaf_rows,
            page_count: pages,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes the pivot view of `records` for `definition`, showing `page`.
pub fn calculate_pivot(records: &[Record], definition: &PivotDefinition, page: PageRequest) -> PivotView {
    PivotCalculator::new(records, definition, page).calculate()
}
