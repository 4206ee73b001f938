//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot Table calculation engine.
//!
//! Groups flat records by row and column fields, aggregates the value
//! fields at every intersection, inserts subtotal rows, paginates the
//! result and computes merged-cell row spans. It depends on `records`
//! only for the shared record types.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot table IS)
//! - `zones`: Field assignment edits that produce a definition
//! - `hierarchy` / `columns`: Group trees for the row and column axes
//! - `flatten` / `paginate` / `span`: Row sequence, paging and merged cells
//! - `aggregate` / `pivot_data`: Cell values, subtotals and the grand total
//! - `engine`: Calculation entry point (HOW we calculate)

pub mod aggregate;
pub mod columns;
pub mod definition;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod hierarchy;
pub mod paginate;
pub mod pivot_data;
pub mod span;
pub mod zones;

pub use aggregate::{aggregate, count_records, rollup, AggregateValues};
pub use columns::{build_final_columns, header_row_count, ColumnHierarchy, FinalColumn, TOTAL_COLUMN_KEY};
pub use definition::*;
pub use engine::{calculate_pivot, PivotView};
pub use error::{PivotError, PivotResult};
pub use flatten::{flatten_rows, FlatRow, SUBTOTAL_SUFFIX, TOTAL_ROW_KEY, TOTAL_ROW_LABEL};
pub use hierarchy::{group_label, GroupPath, Hierarchy, HierarchyNode, NodeId, PathSegment, RecordId, MISSING_VALUE};
pub use paginate::{leaf_row_count, page_bounds, page_count, paginate};
pub use pivot_data::{compute_pivot_data, grand_total, GrandTotal, PivotData};
pub use span::{compute_row_spans, RowSpanEntry, RowSpanMap};
pub use zones::{ClearTarget, FieldZones, Zone};

pub use records::{FieldValue, Record};
