//! FILENAME: core/table-engine/src/aggregate.rs
//! Aggregation Engine - annotates every group with per-column summaries.
//!
//! Aggregates are computed post-order (children before parents) by merging
//! child accumulators into their parent, and are recomputed from scratch on
//! every run. Columns that are currently grouped are not aggregated.

use records::{AggregateKind, ColumnDef, ColumnRegistry, Row};

use crate::group::{RowNode, RowTree};
use crate::logging::log_debug;

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Running extremes of the numeric values seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeAccumulator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeAccumulator {
    pub fn add_number(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn merge(&mut self, other: &RangeAccumulator) {
        if let Some(other_min) = other.min {
            self.min = Some(self.min.map_or(other_min, |m| m.min(other_min)));
        }
        if let Some(other_max) = other.max {
            self.max = Some(self.max.map_or(other_max, |m| m.max(other_max)));
        }
    }

    /// `round((min + max) / 2)`, or 0 when no numeric value was seen.
    ///
    /// This is the middle of the value range, not a median: `[1, 2, 100]`
    /// yields 51.
    pub fn midpoint(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => round_half_up((min + max) / 2.0),
            _ => 0.0,
        }
    }
}

/// Rounds to the nearest integer, halves toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

// ============================================================================
// TREE ANNOTATION
// ============================================================================

/// Columns that receive an aggregate on group nodes of `tree`.
pub fn aggregated_columns<'a>(registry: &'a ColumnRegistry, tree: &RowTree) -> Vec<&'a ColumnDef> {
    registry
        .iter()
        .filter(|c| c.has_aggregate())
        .filter(|c| !tree.group_by().iter().any(|g| *g == c.id))
        .collect()
}

/// Computes every aggregate of every group in `tree`.
pub fn aggregate_tree(tree: &mut RowTree, rows: &[Row], registry: &ColumnRegistry) {
    let columns = aggregated_columns(registry, tree);
    if columns.is_empty() || !tree.is_grouped() {
        return;
    }

    for column in &columns {
        match column.aggregate_kind {
            AggregateKind::Count => {
                let ids: Vec<_> = tree.group_ids().collect();
                for id in ids {
                    if let RowNode::Group(group) = tree.node_mut(id) {
                        let count = group.leaf_count as f64;
                        group.aggregates.insert(column.id.clone(), count);
                    }
                }
            }
            AggregateKind::RangeMidpoint => aggregate_range_midpoint(tree, rows, column),
            AggregateKind::None => {}
        }
    }

    log_debug!(
        "AGGREGATE",
        "{} column(s) over {} group(s)",
        columns.len(),
        tree.group_count()
    );
}

fn aggregate_range_midpoint(tree: &mut RowTree, rows: &[Row], column: &ColumnDef) {
    let mut accumulators = vec![RangeAccumulator::default(); tree.len()];

    // Children always have larger ids than their parent.
    for id in (0..tree.len()).rev() {
        let mut acc = RangeAccumulator::default();
        match tree.node(id) {
            RowNode::Leaf(leaf) => {
                if let Some(n) = column.value(&rows[leaf.row]).to_number() {
                    acc.add_number(n);
                }
            }
            RowNode::Group(group) => {
                for &child in &group.children {
                    acc.merge(&accumulators[child]);
                }
            }
        }
        accumulators[id] = acc;

        if let RowNode::Group(group) = tree.node_mut(id) {
            group.aggregates.insert(column.id.clone(), acc.midpoint());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_is_not_a_median() {
        let mut acc = RangeAccumulator::default();
        for n in [1.0, 2.0, 100.0] {
            acc.add_number(n);
        }
        assert_eq!(acc.midpoint(), 51.0);
    }

    #[test]
    fn midpoint_without_numbers_is_zero() {
        assert_eq!(RangeAccumulator::default().midpoint(), 0.0);
    }

    #[test]
    fn merge_combines_extremes() {
        let mut left = RangeAccumulator::default();
        left.add_number(10.0);
        let mut right = RangeAccumulator::default();
        right.add_number(-4.0);
        right.add_number(3.0);
        left.merge(&right);
        left.merge(&RangeAccumulator::default());
        assert_eq!((left.min, left.max), (Some(-4.0), Some(10.0)));
        assert_eq!(left.midpoint(), 3.0);
    }

    #[test]
    fn rounds_halves_upward() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(7.49), 7.0);
    }
}
