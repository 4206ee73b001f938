//! FILENAME: core/pivot-engine/src/pivot_data.rs
//! Pivot Data - the aggregate matrix behind the body cells.
//!
//! Cells are indexed by flat-row position, then by column group (one group
//! per leaf column, or a single group without column fields), then by
//! aggregate key. Display keys are never used for lookup: group values may
//! contain `'|'`, so two distinct groups can render the same key.
//!
//! Data rows (and the synthetic total row) are aggregated directly from the
//! records in the row/column intersection. Subtotal rows are rolled up from
//! the already-computed cells of their direct children, so the flat rows
//! must be visited in order (children precede their subtotal).

use records::Record;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, count_records, rollup, AggregateValues};
use crate::columns::{ColumnHierarchy, FinalColumn};
use crate::definition::{PivotDefinition, PivotShape};
use crate::flatten::FlatRow;
use crate::hierarchy::{GroupPath, NodeId, RecordId};

// ============================================================================
// PIVOT DATA
// ============================================================================

/// Flat row -> column group -> formatted aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PivotData {
    cells: Vec<Vec<AggregateValues>>,
}

impl PivotData {
    /// The aggregates of one row/column-group intersection.
    pub fn values(&self, row: usize, column_group: usize) -> Option<&AggregateValues> {
        self.cells.get(row).and_then(|groups| groups.get(column_group))
    }

    /// The formatted value at a cell, `""` when nothing was computed.
    pub fn get(&self, row: usize, column_group: usize, agg_key: &str) -> &str {
        self.values(row, column_group)
            .map(|v| v.get(agg_key))
            .unwrap_or("")
    }

    /// The value a final column shows on the flat row at `row`.
    pub fn cell(&self, row: usize, column: &FinalColumn) -> &str {
        self.get(row, column.column_index, &column.agg_key())
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The path each column group filters on; `None` means every record.
fn column_groups<'a>(definition: &PivotDefinition, columns: &'a ColumnHierarchy) -> Vec<Option<&'a GroupPath>> {
    if definition.column_fields.is_empty() {
        vec![None]
    } else {
        columns.leaf_paths().into_iter().map(Some).collect()
    }
}

/// Computes every body cell for the flattened rows.
pub fn compute_pivot_data(
    records: &[Record],
    definition: &PivotDefinition,
    flat_rows: &[FlatRow],
    columns: &ColumnHierarchy,
    final_columns: &[FinalColumn],
) -> PivotData {
    if final_columns.is_empty() {
        return PivotData::default();
    }

    let groups = column_groups(definition, columns);
    let mut cells: Vec<Vec<AggregateValues>> = Vec::with_capacity(flat_rows.len());
    let mut children_of: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();

    for (index, row) in flat_rows.iter().enumerate() {
        let row_cells: Vec<AggregateValues> = if row.is_subtotal {
            let children = row
                .node
                .and_then(|id| children_of.get(&id))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            (0..groups.len())
                .map(|group| {
                    let mut values = AggregateValues::new();
                    for column in final_columns.iter().filter(|c| c.column_index == group) {
                        let agg_key = column.agg_key();
                        let total = rollup(children.iter().map(|&child| cells[child][group].get(&agg_key)));
                        values.insert(agg_key, total);
                    }
                    values
                })
                .collect()
        } else {
            groups
                .iter()
                .enumerate()
                .map(|(group, path)| {
                    let members: Vec<RecordId> = match path {
                        Some(path) => row
                            .members
                            .iter()
                            .copied()
                            .filter(|&id| path.matches(&records[id]))
                            .collect(),
                        None => row.members.clone(),
                    };

                    let mut values = aggregate(records, &members, &definition.value_fields);
                    for column in final_columns
                        .iter()
                        .filter(|c| c.is_record_count && c.column_index == group)
                    {
                        values.insert(column.agg_key(), count_records(&members));
                    }
                    values
                })
                .collect()
        };
        cells.push(row_cells);

        if let Some(parent) = row.parent_node {
            children_of.entry(parent).or_default().push(index);
        }
    }

    log::trace!(
        "computed pivot data: {} rows x {} column groups",
        cells.len(),
        groups.len()
    );
    PivotData { cells }
}

// ============================================================================
// GRAND TOTAL
// ============================================================================

/// Column-wise totals over every data row, one per final column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrandTotal {
    values: Vec<String>,
}

impl GrandTotal {
    /// Total of the final column at `column`, `""` when nothing contributed.
    pub fn get(&self, column: usize) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sums each final column over the non-subtotal rows.
///
/// Only grouped layouts with at least one value field have a grand total.
pub fn grand_total(
    shape: PivotShape,
    definition: &PivotDefinition,
    flat_rows: &[FlatRow],
    final_columns: &[FinalColumn],
    data: &PivotData,
) -> Option<GrandTotal> {
    if shape != PivotShape::Grouped || definition.value_fields.is_empty() {
        return None;
    }

    let values = final_columns
        .iter()
        .map(|column| {
            rollup(
                flat_rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| !r.is_subtotal)
                    .map(|(i, _)| data.cell(i, column)),
            )
        })
        .collect();
    Some(GrandTotal { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::build_final_columns;
    use crate::definition::AggregationType;
    use crate::flatten::flatten_rows;
    use crate::hierarchy::Hierarchy;

    struct Computed {
        rows: Vec<FlatRow>,
        columns: Vec<FinalColumn>,
        data: PivotData,
        total: Option<GrandTotal>,
    }

    impl Computed {
        /// Cell of the row displayed as `key` (keys are unique in these fixtures).
        fn cell(&self, key: &str, column: usize) -> &str {
            let row = self.rows.iter().position(|r| r.key == key).unwrap();
            self.data.cell(row, &self.columns[column])
        }

        fn total(&self, column: usize) -> &str {
            self.total.as_ref().unwrap().get(column)
        }
    }

    fn compute(records: &[Record], definition: &PivotDefinition) -> Computed {
        let shape = definition.shape();
        let row_tree = Hierarchy::build(records, &definition.row_fields);
        let rows = flatten_rows(shape, &row_tree, records.len());
        let column_tree = ColumnHierarchy::build(
            records,
            &definition.column_fields,
            definition.value_fields.len(),
        );
        let columns = build_final_columns(definition, &column_tree.leaf_keys());
        let data = compute_pivot_data(records, definition, &rows, &column_tree, &columns);
        let total = grand_total(shape, definition, &rows, &columns, &data);
        Computed { rows, columns, data, total }
    }

    fn sales() -> Vec<Record> {
        vec![
            Record::new().with("region", "East").with("rep", "A").with("year", 2023).with("amount", 10),
            Record::new().with("region", "East").with("rep", "B").with("year", 2024).with("amount", 20),
            Record::new().with("region", "West").with("rep", "C").with("year", 2023).with("amount", 5),
        ]
    }

    #[test]
    fn test_single_level_sums_and_grand_total() {
        let def = PivotDefinition::new()
            .with_rows(["region"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&sales(), &def);

        assert_eq!(out.cell("East", 0), "30");
        assert_eq!(out.cell("West", 0), "5");
        assert_eq!(out.columns[0].key, "total-amount_sum");
        assert_eq!(out.total(0), "35");
    }

    #[test]
    fn test_subtotals_roll_up_direct_children() {
        let def = PivotDefinition::new()
            .with_rows(["region", "rep"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&sales(), &def);

        assert_eq!(out.cell("East|A", 0), "10");
        assert_eq!(out.cell("East|B", 0), "20");
        assert_eq!(out.cell("East-subtotal", 0), "30");
        assert_eq!(out.cell("West-subtotal", 0), "5");
        // Subtotals are excluded from the grand total.
        assert_eq!(out.total(0), "35");
    }

    #[test]
    fn test_average_subtotal_sums_child_averages() {
        let records = vec![
            Record::new().with("region", "East").with("rep", "A").with("amount", 10),
            Record::new().with("region", "East").with("rep", "A").with("amount", 20),
            Record::new().with("region", "East").with("rep", "B").with("amount", 3),
        ];
        let def = PivotDefinition::new()
            .with_rows(["region", "rep"])
            .with_value("amount", AggregationType::Average);
        let out = compute(&records, &def);

        assert_eq!(out.cell("East|A", 0), "15.00");
        assert_eq!(out.cell("East|B", 0), "3.00");
        assert_eq!(out.cell("East-subtotal", 0), "18");
    }

    #[test]
    fn test_nested_subtotals_roll_up_subtotals() {
        let records = vec![
            Record::new().with("a", "x").with("b", "y").with("c", "1").with("n", 1),
            Record::new().with("a", "x").with("b", "y").with("c", "2").with("n", 2),
            Record::new().with("a", "x").with("b", "z").with("c", "3").with("n", 4),
        ];
        let def = PivotDefinition::new()
            .with_rows(["a", "b", "c"])
            .with_value("n", AggregationType::Sum);
        let out = compute(&records, &def);

        assert_eq!(out.cell("x|y-subtotal", 0), "3");
        assert_eq!(out.cell("x|z-subtotal", 0), "4");
        assert_eq!(out.cell("x-subtotal", 0), "7");
    }

    #[test]
    fn test_zero_subtotal_renders_blank_like_a_direct_sum() {
        let records = vec![
            Record::new().with("region", "East").with("rep", "A").with("amount", 5),
            Record::new().with("region", "East").with("rep", "B").with("amount", -5),
            Record::new().with("region", "West").with("rep", "C").with("amount", 0),
        ];
        let def = PivotDefinition::new()
            .with_rows(["region", "rep"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&records, &def);

        let east = out.rows.iter().find(|r| r.key == "East-subtotal").unwrap();
        let direct = aggregate(&records, &east.members, &def.value_fields);
        assert_eq!(direct.get("amount_sum"), "");
        assert_eq!(out.cell("East-subtotal", 0), "");
        assert_eq!(out.cell("West|C", 0), "");
        assert_eq!(out.total(0), "");
    }

    #[test]
    fn test_separator_in_row_values_keeps_cells_apart() {
        let records = vec![
            Record::new().with("region", "a|b").with("rep", "c").with("amount", 1),
            Record::new().with("region", "a").with("rep", "b|c").with("amount", 100),
        ];
        let def = PivotDefinition::new()
            .with_rows(["region", "rep"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&records, &def);

        // a|b|c, a|b-subtotal, a|b|c, a-subtotal
        assert_eq!(out.rows[0].key, out.rows[2].key);
        assert_eq!(out.data.cell(0, &out.columns[0]), "1");
        assert_eq!(out.data.cell(1, &out.columns[0]), "1");
        assert_eq!(out.data.cell(2, &out.columns[0]), "100");
        assert_eq!(out.data.cell(3, &out.columns[0]), "100");
        assert_eq!(out.total(0), "101");
    }

    #[test]
    fn test_separator_in_column_values_keeps_cells_apart() {
        let records = vec![
            Record::new().with("region", "East").with("year", "a|b").with("quarter", "c").with("amount", 1),
            Record::new().with("region", "East").with("year", "a").with("quarter", "b|c").with("amount", 100),
        ];
        let def = PivotDefinition::new()
            .with_rows(["region"])
            .with_columns(["year", "quarter"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&records, &def);

        assert_eq!(out.columns[0].key, out.columns[1].key);
        assert_eq!(out.cell("East", 0), "1");
        assert_eq!(out.cell("East", 1), "100");
        assert_eq!(out.total(0), "1");
        assert_eq!(out.total(1), "100");
    }

    #[test]
    fn test_column_intersections_filter_records() {
        let def = PivotDefinition::new()
            .with_rows(["region"])
            .with_columns(["year"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&sales(), &def);

        assert_eq!(out.cell("East", 0), "10");
        assert_eq!(out.cell("East", 1), "20");
        assert_eq!(out.cell("West", 0), "5");
        assert_eq!(out.cell("West", 1), "");

        assert_eq!(out.columns[0].key, "2023|amount_sum");
        assert_eq!(out.total(0), "15");
        assert_eq!(out.total(1), "20");
    }

    #[test]
    fn test_values_only_single_total_row() {
        let def = PivotDefinition::new()
            .with_value("amount", AggregationType::Sum)
            .with_value("amount", AggregationType::Count);
        let out = compute(&sales(), &def);

        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.cell("total", 0), "35");
        assert_eq!(out.cell("total", 1), "3");
        assert!(out.total.is_none());
    }

    #[test]
    fn test_columns_only_breaks_total_row_down() {
        let def = PivotDefinition::new()
            .with_columns(["year"])
            .with_value("amount", AggregationType::Sum);
        let out = compute(&sales(), &def);

        assert_eq!(out.cell("total", 0), "15");
        assert_eq!(out.cell("total", 1), "20");
        assert!(out.total.is_none());
    }

    #[test]
    fn test_record_count_columns_without_values() {
        let def = PivotDefinition::new().with_rows(["region"]).with_columns(["year"]);
        let out = compute(&sales(), &def);

        assert!(out.columns[0].is_record_count);
        assert_eq!(out.cell("East", 0), "1");
        assert_eq!(out.cell("West", 0), "1");
        assert_eq!(out.cell("West", 1), "");
        assert!(out.total.is_none());
    }

    #[test]
    fn test_rows_only_has_no_cells() {
        let def = PivotDefinition::new().with_rows(["region"]);
        let out = compute(&sales(), &def);
        assert_eq!(out.rows.len(), 2);
        assert!(out.data.is_empty());
        assert!(out.total.is_none());
    }
}
