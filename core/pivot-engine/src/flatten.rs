//! FILENAME: core/pivot-engine/src/flatten.rs
//! Row Flattening - the row tree as an ordered, render-ready sequence.
//!
//! Leaf groups become data rows. Every internal group contributes one
//! subtotal row, emitted right after all of its descendants (so the deepest
//! subtotals come first and the outermost group's subtotal closes the block).

use serde::{Deserialize, Serialize};

use crate::definition::PivotShape;
use crate::hierarchy::{GroupPath, Hierarchy, NodeId, RecordId};

/// Key of the synthetic single row used when no row fields are configured.
pub const TOTAL_ROW_KEY: &str = "total";

/// Label of the synthetic single row.
pub const TOTAL_ROW_LABEL: &str = "Total";

/// Suffix appended to a group key to form its subtotal row key.
pub const SUBTOTAL_SUFFIX: &str = "-subtotal";

/// One renderable body row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    /// Display key ("East|A", "East-subtotal", "total"). Values containing
    /// `'|'` can make two keys equal, so lookups go through `path`, `node`
    /// or the row's position instead.
    pub key: String,

    /// Display key of the enclosing group, `None` at the outermost level.
    pub parent_key: Option<String>,

    /// Field/value path of the group this row shows.
    pub path: GroupPath,

    /// Display values along the path, outermost first.
    pub path_values: Vec<String>,

    /// Records summarized by this row.
    pub members: Vec<RecordId>,

    /// Depth of the group this row shows.
    pub level: usize,

    pub is_subtotal: bool,

    /// Level of the group a subtotal row closes.
    pub subtotal_level: Option<usize>,

    /// Source node in the row hierarchy (`None` for the synthetic total row).
    pub node: Option<NodeId>,

    /// Node of the enclosing group, `None` at the outermost level.
    pub parent_node: Option<NodeId>,
}

impl FlatRow {
    /// The single synthetic row covering every record.
    pub fn total(record_count: usize) -> Self {
        FlatRow {
            key: TOTAL_ROW_KEY.to_string(),
            parent_key: None,
            path: GroupPath::new(),
            path_values: vec![TOTAL_ROW_LABEL.to_string()],
            members: (0..record_count).collect(),
            level: 0,
            is_subtotal: false,
            subtotal_level: None,
            node: None,
            parent_node: None,
        }
    }

    /// Display value at `level`, if the row's path reaches that deep.
    pub fn value_at(&self, level: usize) -> Option<&str> {
        self.path_values.get(level).map(String::as_str)
    }

    /// Whether this is a subtotal closing a group at `level` or above.
    pub fn closes_level_at_or_above(&self, level: usize) -> bool {
        self.is_subtotal && self.subtotal_level.is_some_and(|l| l <= level)
    }
}

/// Flattens the row hierarchy according to the pivot shape.
pub fn flatten_rows(shape: PivotShape, rows: &Hierarchy, record_count: usize) -> Vec<FlatRow> {
    match shape {
        PivotShape::ValuesOnly | PivotShape::ColumnsOnly => vec![FlatRow::total(record_count)],
        PivotShape::Empty => Vec::new(),
        PivotShape::Grouped => {
            let mut out = Vec::with_capacity(rows.len());
            for &root in rows.roots() {
                push_node(rows, root, &mut out);
            }
            out
        }
    }
}

/// Emits `id`'s rows depth-first: descendants first, then its subtotal.
fn push_node(rows: &Hierarchy, id: NodeId, out: &mut Vec<FlatRow>) {
    let node = rows.node(id);
    let key = node.key();
    let parent_key = node.parent.map(|p| rows.node(p).key());
    let path_values: Vec<String> = node.path.values().map(str::to_string).collect();

    if node.is_leaf() {
        out.push(FlatRow {
            key,
            parent_key,
            path: node.path.clone(),
            path_values,
            members: node.members.clone(),
            level: node.level,
            is_subtotal: false,
            subtotal_level: None,
            node: Some(id),
            parent_node: node.parent,
        });
        return;
    }

    for &child in &node.children {
        push_node(rows, child, out);
    }

    out.push(FlatRow {
        key: format!("{}{}", key, SUBTOTAL_SUFFIX),
        parent_key,
        path: node.path.clone(),
        path_values,
        members: node.members.clone(),
        level: node.level,
        is_subtotal: true,
        subtotal_level: Some(node.level),
        node: Some(id),
        parent_node: node.parent,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::Record;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("region", "East").with("rep", "A").with("amount", 10),
            Record::new().with("region", "East").with("rep", "B").with("amount", 20),
            Record::new().with("region", "West").with("rep", "C").with("amount", 5),
        ]
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn keys(rows: &[FlatRow]) -> Vec<&str> {
        rows.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_single_level_has_no_subtotals() {
        let records = records();
        let tree = Hierarchy::build(&records, &fields(&["region"]));
        let rows = flatten_rows(PivotShape::Grouped, &tree, records.len());

        assert_eq!(keys(&rows), vec!["East", "West"]);
        assert!(rows.iter().all(|r| !r.is_subtotal));
        assert_eq!(rows[0].members, vec![0, 1]);
    }

    #[test]
    fn test_subtotal_follows_descendants() {
        let records = records();
        let tree = Hierarchy::build(&records, &fields(&["region", "rep"]));
        let rows = flatten_rows(PivotShape::Grouped, &tree, records.len());

        assert_eq!(
            keys(&rows),
            vec!["East|A", "East|B", "East-subtotal", "West|C", "West-subtotal"]
        );
        let east_total = &rows[2];
        assert!(east_total.is_subtotal);
        assert_eq!(east_total.subtotal_level, Some(0));
        assert_eq!(east_total.path_values, vec!["East"]);
        assert_eq!(east_total.members, vec![0, 1]);
        assert_eq!(rows[0].parent_key.as_deref(), Some("East"));
        assert_eq!(east_total.parent_key, None);
        assert_eq!(rows[0].parent_node, east_total.node);
        assert_eq!(east_total.parent_node, None);
    }

    #[test]
    fn test_every_internal_level_gets_a_subtotal() {
        let records = vec![
            Record::new().with("a", "x").with("b", "y").with("c", "1"),
            Record::new().with("a", "x").with("b", "y").with("c", "2"),
            Record::new().with("a", "x").with("b", "z").with("c", "3"),
        ];
        let tree = Hierarchy::build(&records, &fields(&["a", "b", "c"]));
        let rows = flatten_rows(PivotShape::Grouped, &tree, records.len());

        assert_eq!(
            keys(&rows),
            vec!["x|y|1", "x|y|2", "x|y-subtotal", "x|z|3", "x|z-subtotal", "x-subtotal"]
        );
        assert_eq!(rows[2].subtotal_level, Some(1));
        assert_eq!(rows[5].subtotal_level, Some(0));
    }

    #[test]
    fn test_synthetic_total_row_for_single_total_shapes() {
        for shape in [PivotShape::ValuesOnly, PivotShape::ColumnsOnly] {
            let rows = flatten_rows(shape, &Hierarchy::default(), 3);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].key, TOTAL_ROW_KEY);
            assert_eq!(rows[0].path_values, vec![TOTAL_ROW_LABEL]);
            assert_eq!(rows[0].members, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_synthetic_total_row_without_records() {
        let rows = flatten_rows(PivotShape::ValuesOnly, &Hierarchy::default(), 0);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].members.is_empty());
    }

    #[test]
    fn test_empty_shape_and_empty_tree() {
        assert!(flatten_rows(PivotShape::Empty, &Hierarchy::default(), 5).is_empty());
        assert!(flatten_rows(PivotShape::Grouped, &Hierarchy::default(), 0).is_empty());
    }

    #[test]
    fn test_closes_level_at_or_above() {
        let records = records();
        let tree = Hierarchy::build(&records, &fields(&["region", "rep"]));
        let rows = flatten_rows(PivotShape::Grouped, &tree, records.len());

        assert!(rows[2].closes_level_at_or_above(0));
        assert!(rows[2].closes_level_at_or_above(1));
        assert!(!rows[0].closes_level_at_or_above(1));
    }
}
