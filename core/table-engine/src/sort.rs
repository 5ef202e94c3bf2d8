//! FILENAME: core/table-engine/src/sort.rs
//! Sort Engine - stable multi-key ordering of siblings at every tree level.
//!
//! Sorting never changes the shape of the tree: only the order of each
//! group's children (and of the top-level nodes) changes.
//!
//! Ordering policy:
//! - Keys apply in order; the first non-equal key decides.
//! - Fully tied nodes keep their previous relative order (stable sort).
//! - Empty values sort last in both directions.
//! - Numbers compare numerically, text alphanumerically (digit runs as
//!   numbers), booleans `false < true`; across kinds Number < Text < Boolean.
//! - A group compares by its aggregate when the key's column has one and by
//!   its own grouping value otherwise. Records compare by their field value.

use std::borrow::Cow;
use std::cmp::Ordering;

use records::{ColumnDef, Row, Value};

use crate::group::{NodeId, RowNode, RowTree};
use crate::logging::log_debug;

/// A sort key resolved against the registry.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSortKey<'a> {
    pub column: &'a ColumnDef,
    pub descending: bool,
}

// ============================================================================
// VALUE COMPARISON
// ============================================================================

/// Compares two values in the given direction. Empty values are always last.
pub fn compare_values(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_present(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Ascending comparison of two non-empty values.
fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Text(x), Value::Text(y)) => compare_alphanumeric(x, y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

/// Compares strings chunk by chunk, where a chunk is either a run of ASCII
/// digits or a run of anything else. Two digit runs compare by numeric
/// value, so `"item2" < "item10"`.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (parse_digits(x), parse_digits(y)) {
                    (Some(nx), Some(ny)) => nx.cmp(&ny),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn parse_digits(chunk: &str) -> Option<u128> {
    if chunk.bytes().all(|b| b.is_ascii_digit()) {
        chunk.parse().ok()
    } else {
        None
    }
}

/// Splits a string into alternating digit / non-digit runs.
struct Chunks<'s> {
    rest: &'s str,
}

impl<'s> Chunks<'s> {
    fn new(s: &'s str) -> Self {
        Chunks { rest: s }
    }
}

impl<'s> Iterator for Chunks<'s> {
    type Item = &'s str;

    fn next(&mut self) -> Option<&'s str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map_or(self.rest.len(), |(i, _)| i);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

// ============================================================================
// TREE SORT
// ============================================================================

/// The value a node is compared by for one sort column.
fn sort_value<'n>(tree: &'n RowTree, rows: &'n [Row], id: NodeId, column: &ColumnDef) -> Cow<'n, Value> {
    match tree.node(id) {
        RowNode::Leaf(leaf) => Cow::Borrowed(column.value(&rows[leaf.row])),
        RowNode::Group(group) => match group.aggregate(&column.id) {
            Some(aggregate) => Cow::Owned(Value::Number(aggregate)),
            None => Cow::Borrowed(&group.value),
        },
    }
}

fn compare_nodes(tree: &RowTree, rows: &[Row], keys: &[ResolvedSortKey<'_>], a: NodeId, b: NodeId) -> Ordering {
    for key in keys {
        let va = sort_value(tree, rows, a, key.column);
        let vb = sort_value(tree, rows, b, key.column);
        let ordering = compare_values(&va, &vb, key.descending);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn sort_siblings(tree: &RowTree, rows: &[Row], keys: &[ResolvedSortKey<'_>], siblings: &mut [NodeId]) {
    // `sort_by` is stable.
    siblings.sort_by(|&a, &b| compare_nodes(tree, rows, keys, a, b));
}

/// Sorts the siblings of every level of `tree` by `keys`.
pub fn sort_tree(tree: &mut RowTree, rows: &[Row], keys: &[ResolvedSortKey<'_>]) {
    if keys.is_empty() || tree.is_empty() {
        return;
    }

    let mut roots = std::mem::take(tree.roots_mut());
    sort_siblings(tree, rows, keys, &mut roots);
    *tree.roots_mut() = roots;

    let group_ids: Vec<NodeId> = tree.group_ids().collect();
    for id in &group_ids {
        let mut children = match tree.node_mut(*id) {
            RowNode::Group(group) => std::mem::take(&mut group.children),
            RowNode::Leaf(_) => continue,
        };
        sort_siblings(tree, rows, keys, &mut children);
        if let RowNode::Group(group) = tree.node_mut(*id) {
            group.children = children;
        }
    }

    log_debug!(
        "SORT",
        "sorted {} level(s) by {} key(s)",
        group_ids.len() + 1,
        keys.len()
    );
}
