//! FILENAME: core/pivot-engine/src/columns.rs
//! Column Axis - header hierarchy and the final (column x value) list.
//!
//! The column hierarchy is the same group tree as the row side, plus a
//! `col_span` per node so a header can stretch across every aggregation
//! sub-column beneath it. Final columns pair each leaf column key with each
//! value field and are the column axis of the pivot matrix.

use records::Record;
use serde::{Deserialize, Serialize};

use crate::definition::{AggregationType, PivotDefinition, ValueField};
use crate::hierarchy::{GroupPath, Hierarchy, HierarchyNode, NodeId};

/// Column key used when no column fields are configured.
pub const TOTAL_COLUMN_KEY: &str = "total";

// ============================================================================
// COLUMN HIERARCHY
// ============================================================================

/// Column group tree with header spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnHierarchy {
    tree: Hierarchy,
    col_spans: Vec<usize>,
}

impl ColumnHierarchy {
    /// Groups `records` by the column fields and computes header spans.
    ///
    /// A leaf spans `max(1, value_count)` columns; an internal node spans
    /// the sum of its children.
    pub fn build(records: &[Record], fields: &[String], value_count: usize) -> Self {
        let tree = Hierarchy::build(records, fields);
        let mut col_spans = vec![0; tree.len()];

        // Arena is pre-order, so walking it backwards visits children
        // before their parent.
        for id in (0..tree.len()).rev() {
            let node = tree.node(id);
            col_spans[id] = if node.is_leaf() {
                value_count.max(1)
            } else {
                node.children.iter().map(|&c| col_spans[c]).sum()
            };
        }

        ColumnHierarchy { tree, col_spans }
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        self.tree.node(id)
    }

    pub fn col_span(&self, id: NodeId) -> usize {
        self.col_spans[id]
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Leaf column keys in display order.
    pub fn leaf_keys(&self) -> Vec<String> {
        self.tree
            .leaves()
            .into_iter()
            .map(|id| self.tree.node(id).key())
            .collect()
    }

    /// Paths of the leaf columns in display order. Unlike the joined keys,
    /// these never collide.
    pub fn leaf_paths(&self) -> Vec<&GroupPath> {
        self.tree
            .leaves()
            .into_iter()
            .map(|id| &self.tree.node(id).path)
            .collect()
    }

    /// Header rows, one per column field, each in display order.
    pub fn levels(&self) -> Vec<Vec<NodeId>> {
        self.tree.levels()
    }
}

/// Number of header rows above the body: one per column field, plus one
/// for the value-field labels when any value field is configured.
pub fn header_row_count(definition: &PivotDefinition) -> usize {
    definition.column_fields.len() + usize::from(!definition.value_fields.is_empty())
}

// ============================================================================
// FINAL COLUMNS
// ============================================================================

/// One (leaf column x value field) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalColumn {
    /// Unique key of this column.
    pub key: String,

    /// Leaf column key this column reads from ("total" without column fields).
    /// Display only; two leaves may join to the same text.
    pub column_key: String,

    /// Position of the column group this column reads from: the index of
    /// its leaf in display order, or 0 for the single total group.
    pub column_index: usize,

    /// The aggregation rendered in this column.
    pub value_field: ValueField,

    /// Header label.
    pub label: String,

    /// Set for the stand-in count column used when no value fields exist.
    /// Such a column counts the records of each intersection.
    pub is_record_count: bool,
}

impl FinalColumn {
    fn aggregated(key: String, column_key: String, column_index: usize, value_field: &ValueField) -> Self {
        FinalColumn {
            key,
            column_key,
            column_index,
            label: value_field.label(),
            value_field: value_field.clone(),
            is_record_count: false,
        }
    }

    fn record_count(column_key: &str, column_index: usize) -> Self {
        FinalColumn {
            key: column_key.to_string(),
            column_key: column_key.to_string(),
            column_index,
            value_field: ValueField::new(column_key, AggregationType::Count),
            label: column_key.to_string(),
            is_record_count: true,
        }
    }

    /// Key of this column's entry in the aggregate map.
    pub fn agg_key(&self) -> String {
        self.value_field.agg_key()
    }
}

/// Builds the final column list for a definition and its leaf column keys.
pub fn build_final_columns(definition: &PivotDefinition, leaf_keys: &[String]) -> Vec<FinalColumn> {
    let has_rows = !definition.row_fields.is_empty();
    let has_columns = !definition.column_fields.is_empty();
    let values = &definition.value_fields;

    match (has_columns, values.is_empty()) {
        (false, false) => values
            .iter()
            .map(|vf| {
                let key = if has_rows {
                    format!("{}-{}", TOTAL_COLUMN_KEY, vf.agg_key())
                } else {
                    vf.agg_key()
                };
                FinalColumn::aggregated(key, TOTAL_COLUMN_KEY.to_string(), 0, vf)
            })
            .collect(),
        (true, true) => leaf_keys
            .iter()
            .enumerate()
            .map(|(index, leaf)| FinalColumn::record_count(leaf, index))
            .collect(),
        (true, false) => leaf_keys
            .iter()
            .enumerate()
            .flat_map(|(index, leaf)| {
                values.iter().map(move |vf| {
                    FinalColumn::aggregated(format!("{}|{}", leaf, vf.agg_key()), leaf.clone(), index, vf)
                })
            })
            .collect(),
        (false, true) => Vec::new(),
    }
}
