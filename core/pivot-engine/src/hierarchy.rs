//! FILENAME: core/pivot-engine/src/hierarchy.rs
//! Group Hierarchy - records grouped into trees keyed by successive fields.
//!
//! The tree is stored as an arena: nodes live in one `Vec` in pre-order and
//! refer to each other by index. Every node carries an explicit `GroupPath`
//! (ordered field/value pairs) from which the `'|'`-joined display keys are
//! derived, so no stage has to split composite strings apart again.
//!
//! Grouping rules:
//! - Values are compared by their text form; absent values group under "N/A".
//! - Groups appear in order of first appearance in the input, never sorted.
//! - A node's children partition its members exactly.

use records::Record;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a node inside a `Hierarchy` arena.
pub type NodeId = usize;

/// Index of a record inside the caller's record slice.
pub type RecordId = usize;

/// Separator used when joining path values into display keys.
pub const KEY_SEPARATOR: &str = "|";

/// Group label substituted for absent values.
pub const MISSING_VALUE: &str = "N/A";

/// Returns the label `record` groups under for `field`.
pub fn group_label(record: &Record, field: &str) -> String {
    record
        .get(field)
        .display_value()
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

// ============================================================================
// GROUP PATH
// ============================================================================

/// One step of a group path: the field grouped on and the value taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub field: String,
    pub value: String,
}

/// The ordered field/value pairs leading from the root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupPath {
    segments: SmallVec<[PathSegment; 4]>,
}

impl GroupPath {
    pub fn new() -> Self {
        GroupPath::default()
    }

    /// Returns a new path extended by one segment.
    pub fn child(&self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment {
            field: field.into(),
            value: value.into(),
        });
        GroupPath { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.value.as_str())
    }

    pub fn value_at(&self, level: usize) -> Option<&str> {
        self.segments.get(level).map(|s| s.value.as_str())
    }

    /// The display key: values joined by `'|'`.
    pub fn key(&self) -> String {
        self.values().collect::<Vec<_>>().join(KEY_SEPARATOR)
    }

    /// The first `len` segments of this path.
    pub fn prefix(&self, len: usize) -> GroupPath {
        GroupPath {
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }

    /// The path one level up, or `None` at the root level.
    pub fn parent(&self) -> Option<GroupPath> {
        if self.segments.is_empty() {
            None
        } else {
            Some(self.prefix(self.segments.len() - 1))
        }
    }

    pub fn starts_with(&self, other: &GroupPath) -> bool {
        other.len() <= self.len() && self.segments[..other.len()] == other.segments[..]
    }

    /// Whether `record` falls inside the group this path describes.
    pub fn matches(&self, record: &Record) -> bool {
        self.segments
            .iter()
            .all(|segment| group_label(record, &segment.field) == segment.value)
    }
}

// ============================================================================
// HIERARCHY NODE
// ============================================================================

/// A node in the group tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Field/value pairs from the root down to this node.
    pub path: GroupPath,

    /// The group value at this node's level.
    pub value: String,

    /// Depth in the tree (0 = root level).
    pub level: usize,

    pub parent: Option<NodeId>,

    /// Child groups in order of first appearance.
    pub children: Vec<NodeId>,

    /// Records that fall in this group.
    pub members: Vec<RecordId>,
}

impl HierarchyNode {
    /// The `'|'`-joined path key (e.g. "East|A").
    pub fn key(&self) -> String {
        self.path.key()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// HIERARCHY
// ============================================================================

/// An ordered forest of group nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    roots: Vec<NodeId>,
    depth: usize,
}

impl Hierarchy {
    /// Groups `records` by `fields`, outermost first.
    ///
    /// Returns an empty forest when either input is empty.
    pub fn build(records: &[Record], fields: &[String]) -> Self {
        let mut hierarchy = Hierarchy {
            nodes: Vec::new(),
            roots: Vec::new(),
            depth: fields.len(),
        };
        if fields.is_empty() || records.is_empty() {
            return hierarchy;
        }

        let all: Vec<RecordId> = (0..records.len()).collect();
        hierarchy.roots = hierarchy.build_level(records, fields, 0, None, &GroupPath::new(), &all);

        log::trace!(
            "built hierarchy over {:?}: {} roots, {} nodes",
            fields,
            hierarchy.roots.len(),
            hierarchy.nodes.len()
        );
        hierarchy
    }

    /// Recursively builds one level of the tree for the given members.
    fn build_level(
        &mut self,
        records: &[Record],
        fields: &[String],
        level: usize,
        parent: Option<NodeId>,
        parent_path: &GroupPath,
        members: &[RecordId],
    ) -> Vec<NodeId> {
        let field = &fields[level];

        // Partition by label, keeping first-appearance order.
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        let mut groups: Vec<(String, Vec<RecordId>)> = Vec::new();
        for &record_id in members {
            let label = group_label(&records[record_id], field);
            match index.get(&label) {
                Some(&slot) => groups[slot].1.push(record_id),
                None => {
                    index.insert(label.clone(), groups.len());
                    groups.push((label, vec![record_id]));
                }
            }
        }

        let mut ids = Vec::with_capacity(groups.len());
        for (value, group_members) in groups {
            let id = self.nodes.len();
            let path = parent_path.child(field.clone(), value.clone());
            self.nodes.push(HierarchyNode {
                path: path.clone(),
                value,
                level,
                parent,
                children: Vec::new(),
                members: Vec::new(),
            });

            if level + 1 < fields.len() {
                let children =
                    self.build_level(records, fields, level + 1, Some(id), &path, &group_members);
                self.nodes[id].children = children;
            }
            self.nodes[id].members = group_members;
            ids.push(id);
        }
        ids
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id]
    }

    /// All nodes in pre-order (parents before children).
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    /// Number of grouping fields the tree was built from.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf node ids in display order.
    pub fn leaves(&self) -> Vec<NodeId> {
        // Pre-order arena order is display order.
        (0..self.nodes.len())
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Node ids grouped by level, each level in display order.
    pub fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut levels: Vec<Vec<NodeId>> = Vec::new();
        for (id, node) in self.nodes.iter().enumerate() {
            if levels.len() <= node.level {
                levels.resize_with(node.level + 1, Vec::new);
            }
            levels[node.level].push(id);
        }
        levels
    }
}
