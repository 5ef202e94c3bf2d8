//! FILENAME: core/table-engine/src/group.rs
//! Group Builder - partitions the filtered records into a tree.
//!
//! The tree is stored as an arena: every node lives in one `Vec` and refers
//! to its children by index, and every group is also indexed by its path of
//! `(column, value)` pairs. The tree is rebuilt from scratch on every
//! recalculation, so nothing outside refers to nodes by index across runs;
//! expansion state is keyed by path instead.
//!
//! Invariants:
//! - Children of a group are either all leaves (deepest level) or all groups
//!   of the next grouping column.
//! - Distinct values appear in first-seen order among the rows being split.
//! - Empty values form their own group; no record is dropped.
//! - Nodes are pushed parent-first, so a child's id is always greater than
//!   its parent's. Walking ids in reverse visits children before parents.

use records::{ColumnDef, ColumnId, Row, Value};
use rustc_hash::FxHashMap;

use crate::definition::{ExpansionState, GroupPath, RowIndex};
use crate::logging::log_debug;

/// Index of a node in the tree arena.
pub type NodeId = usize;

// ============================================================================
// NODES
// ============================================================================

/// A group of records sharing one value of a grouping column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub column_id: ColumnId,
    pub value: Value,
    pub path: GroupPath,
    /// Grouping level, 0 for the outermost column.
    pub depth: usize,
    pub children: Vec<NodeId>,
    /// Aggregate per column, filled in by the aggregation step.
    pub aggregates: FxHashMap<ColumnId, f64>,
    pub expanded: bool,
    /// Number of records under this group.
    pub leaf_count: usize,
}

impl GroupNode {
    pub fn aggregate(&self, column_id: &str) -> Option<f64> {
        self.aggregates.get(column_id).copied()
    }
}

/// A record in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafNode {
    pub row: RowIndex,
    /// Number of enclosing groups.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowNode {
    Leaf(LeafNode),
    Group(GroupNode),
}

impl RowNode {
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            RowNode::Group(g) => Some(g),
            RowNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            RowNode::Leaf(l) => Some(l),
            RowNode::Group(_) => None,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            RowNode::Leaf(l) => l.depth,
            RowNode::Group(g) => g.depth,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

/// The grouped view of the filtered records.
#[derive(Debug, Clone, Default)]
pub struct RowTree {
    nodes: Vec<RowNode>,
    roots: Vec<NodeId>,
    paths: FxHashMap<GroupPath, NodeId>,
    group_by: Vec<ColumnId>,
}

impl RowTree {
    /// Builds the tree for `filtered` (indices into `rows`) grouped by
    /// `columns`, outermost first. Without grouping columns the tree is a
    /// flat list of leaves.
    pub fn build(rows: &[Row], filtered: &[RowIndex], columns: &[&ColumnDef]) -> Self {
        let mut tree = RowTree {
            nodes: Vec::with_capacity(filtered.len()),
            roots: Vec::new(),
            paths: FxHashMap::default(),
            group_by: columns.iter().map(|c| c.id.clone()).collect(),
        };

        tree.roots = tree.build_level(rows, filtered, columns, 0, &GroupPath::root());

        log_debug!(
            "GROUP",
            "built {} group(s) over {} row(s), levels={}",
            tree.paths.len(),
            filtered.len(),
            columns.len()
        );

        tree
    }

    fn build_level(
        &mut self,
        rows: &[Row],
        indices: &[RowIndex],
        columns: &[&ColumnDef],
        depth: usize,
        parent_path: &GroupPath,
    ) -> Vec<NodeId> {
        let column = match columns.get(depth) {
            Some(c) => *c,
            None => {
                return indices
                    .iter()
                    .map(|&row| self.push(RowNode::Leaf(LeafNode { row, depth })))
                    .collect();
            }
        };

        // Partition in first-seen order of the distinct values.
        let mut slot_of: FxHashMap<&Value, usize> = FxHashMap::default();
        let mut partitions: Vec<(&Value, Vec<RowIndex>)> = Vec::new();
        for &idx in indices {
            let value = column.value(&rows[idx]);
            match slot_of.get(value) {
                Some(&slot) => partitions[slot].1.push(idx),
                None => {
                    slot_of.insert(value, partitions.len());
                    partitions.push((value, vec![idx]));
                }
            }
        }

        let mut ids = Vec::with_capacity(partitions.len());
        for (value, members) in partitions {
            let path = parent_path.child(&column.id, value.clone());
            let id = self.push(RowNode::Group(GroupNode {
                column_id: column.id.clone(),
                value: value.clone(),
                path: path.clone(),
                depth,
                children: Vec::new(),
                aggregates: FxHashMap::default(),
                expanded: false,
                leaf_count: members.len(),
            }));
            self.paths.insert(path.clone(), id);

            let children = self.build_level(rows, &members, columns, depth + 1, &path);
            if let RowNode::Group(group) = &mut self.nodes[id] {
                group.children = children;
            }
            ids.push(id);
        }
        ids
    }

    fn push(&mut self, node: RowNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    // ========================================================================
    // ACCESS
    // ========================================================================

    pub fn node(&self, id: NodeId) -> &RowNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut RowNode {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[RowNode] {
        &self.nodes
    }

    /// Top-level nodes, in display order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.roots
    }

    /// Children of a node; empty for leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id] {
            RowNode::Group(g) => &g.children,
            RowNode::Leaf(_) => &[],
        }
    }

    pub fn group_by(&self) -> &[ColumnId] {
        &self.group_by
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.paths.len()
    }

    /// Looks up a group by its path.
    pub fn find(&self, path: &GroupPath) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    pub fn group(&self, path: &GroupPath) -> Option<&GroupNode> {
        self.find(path).and_then(|id| self.nodes[id].as_group())
    }

    pub fn contains_path(&self, path: &GroupPath) -> bool {
        self.paths.contains_key(path)
    }

    pub fn group_paths(&self) -> impl Iterator<Item = &GroupPath> {
        self.paths.keys()
    }

    /// Ids of the groups, in arena order.
    pub fn group_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, RowNode::Group(_)))
            .map(|(id, _)| id)
    }

    /// Marks every group listed in `expansion` as expanded and every other
    /// group as collapsed. Paths with no group in this tree are ignored.
    pub fn apply_expansion(&mut self, expansion: &ExpansionState) {
        for node in &mut self.nodes {
            if let RowNode::Group(group) = node {
                group.expanded = expansion.is_expanded(&group.path);
            }
        }
    }

    /// Records under `id` in tree order.
    pub fn leaf_rows(&self, id: NodeId) -> Vec<RowIndex> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    /// Every record in the tree, in tree order.
    pub fn all_leaf_rows(&self) -> Vec<RowIndex> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<RowIndex>) {
        match &self.nodes[id] {
            RowNode::Leaf(leaf) => out.push(leaf.row),
            RowNode::Group(group) => {
                for &child in &group.children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }
}

/// Builds the group tree. See [`RowTree::build`].
pub fn group_rows(rows: &[Row], filtered: &[RowIndex], columns: &[&ColumnDef]) -> RowTree {
    RowTree::build(rows, filtered, columns)
}
