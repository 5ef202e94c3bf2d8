//! FILENAME: core/table-engine/tests/test_grouping.rs
//! PURPOSE: Tests for the group tree, group aggregates and group cells.

mod common;

use common::{employee_registry, employee_rows};
use serde_json::json;
use table_engine::{
    calculate_view, AggregateKind, CellKind, ColumnDef, ColumnRegistry, FilterValue, GroupPath,
    GroupState, RowNode, TableCalculator, TableOptions, TableState, Value,
};

fn grouped(columns: &[&str]) -> TableState {
    TableState {
        group_by: GroupState::new(columns.iter().map(|c| c.to_string()).collect()),
        ..TableState::default()
    }
}

// ============================================================================
// TREE SHAPE
// ============================================================================

#[test]
fn test_grouping_keeps_every_filtered_record() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let mut state = grouped(&["dept", "site"]);
    state.filters.set("cost", FilterValue::range(Some(6.0), None));

    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();

    let mut leaves = calc.tree.all_leaf_rows();
    leaves.sort_unstable();
    assert_eq!(leaves, calc.filtered);
}

#[test]
fn test_groups_nest_in_first_seen_order() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let calc = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["dept", "site"]))
        .unwrap();

    let top: Vec<Value> = calc
        .tree
        .roots()
        .iter()
        .map(|&id| calc.tree.node(id).as_group().unwrap().value.clone())
        .collect();
    assert_eq!(top, vec![Value::text("A"), Value::text("B"), Value::text("C"), Value::Empty]);

    let a = calc.tree.find(&GroupPath::from_pairs([("dept", "A")])).unwrap();
    let sites: Vec<Value> = calc
        .tree
        .children(a)
        .iter()
        .map(|&id| calc.tree.node(id).as_group().unwrap().value.clone())
        .collect();
    assert_eq!(sites, vec![Value::text("North"), Value::text("South")]);

    // Deepest groups hold records only.
    let leaf_parent = calc
        .tree
        .find(&GroupPath::from_pairs([("dept", "A"), ("site", "South")]))
        .unwrap();
    for &child in calc.tree.children(leaf_parent) {
        assert!(matches!(calc.tree.node(child), RowNode::Leaf(_)));
    }
}

#[test]
fn test_groups_start_collapsed() {
    let view = calculate_view(
        &employee_rows(),
        &employee_registry(),
        &TableOptions::default(),
        &grouped(&["dept"]),
    )
    .unwrap();

    assert_eq!(view.total_visible, 4);
    assert!(view.rows.iter().all(|r| r.node.is_group()));
    assert_eq!(view.filtered_count, 6);
}

#[test]
fn test_ungrouping_restores_flat_list() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let view = calculate_view(&rows, &registry, &options, &grouped(&[])).unwrap();
    assert_eq!(view.total_visible, 6);
    assert_eq!(view.row_indices(), vec![0, 1, 2, 3, 4, 5]);
}

// ============================================================================
// AGGREGATES
// ============================================================================

#[test]
fn test_range_midpoint_per_group() {
    let rows = records::rows_from_json(&json!([
        { "dept": "A", "cost": 10 },
        { "dept": "B", "cost": 5 },
        { "dept": "A", "cost": 30 }
    ]))
    .unwrap();
    let registry = ColumnRegistry::new(vec![
        ColumnDef::new("dept", "Department").groupable(),
        ColumnDef::new("cost", "Cost").with_aggregate(AggregateKind::RangeMidpoint),
    ])
    .unwrap();
    let options = TableOptions::default();

    let calc = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["dept"]))
        .unwrap();

    let a = calc.tree.group(&GroupPath::from_pairs([("dept", "A")])).unwrap();
    let b = calc.tree.group(&GroupPath::from_pairs([("dept", "B")])).unwrap();
    assert_eq!(a.aggregate("cost"), Some(20.0));
    assert_eq!(b.aggregate("cost"), Some(5.0));
}

#[test]
fn test_group_without_numbers_aggregates_to_zero() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let calc = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["dept"]))
        .unwrap();

    let c = calc.tree.group(&GroupPath::from_pairs([("dept", "C")])).unwrap();
    assert_eq!(c.aggregate("cost"), Some(0.0));
    assert_eq!(c.aggregate("id"), Some(1.0));
}

#[test]
fn test_nested_aggregates_cover_all_records_below() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let calc = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["site", "dept"]))
        .unwrap();

    // North: Ann 10, Dee -, Eve 15.
    let north = calc.tree.group(&GroupPath::from_pairs([("site", "North")])).unwrap();
    assert_eq!(north.aggregate("cost"), Some(13.0));
    assert_eq!(north.aggregate("id"), Some(3.0));

    let north_b = calc
        .tree
        .group(&GroupPath::from_pairs([("site", "North"), ("dept", "B")]))
        .unwrap();
    assert_eq!(north_b.aggregate("cost"), Some(15.0));
}

#[test]
fn test_grouped_columns_are_not_aggregated() {
    let rows = records::rows_from_json(&json!([{ "n": 1 }, { "n": 1 }, { "n": 3 }])).unwrap();
    let registry = ColumnRegistry::new(vec![ColumnDef::new("n", "N")
        .groupable()
        .with_aggregate(AggregateKind::RangeMidpoint)])
    .unwrap();
    let options = TableOptions::default();
    let calc = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["n"]))
        .unwrap();

    let one = calc.tree.group(&GroupPath::from_pairs([("n", 1)])).unwrap();
    assert_eq!(one.aggregate("n"), None);
    assert_eq!(one.leaf_count, 2);
}

// ============================================================================
// GROUP CELLS
// ============================================================================

#[test]
fn test_group_header_cells() {
    let view = calculate_view(
        &employee_rows(),
        &employee_registry(),
        &TableOptions::default(),
        &grouped(&["dept"]),
    )
    .unwrap();

    let dept = view.cell(0, "dept").unwrap();
    assert_eq!(dept.kind, CellKind::Grouped);
    assert_eq!(dept.display, "A (2)");

    let cost = view.cell(0, "cost").unwrap();
    assert_eq!(cost.kind, CellKind::Aggregated);
    assert_eq!(cost.display, "20");

    let count = view.cell(0, "id").unwrap();
    assert_eq!(count.kind, CellKind::Aggregated);
    assert_eq!(count.value, Value::Number(2.0));

    assert_eq!(view.cell(0, "name").unwrap().kind, CellKind::Placeholder);
    assert_eq!(view.cell(0, "name").unwrap().display, "");

    // The group of records without a department.
    assert_eq!(view.cell(3, "dept").unwrap().display, "(blank) (1)");
}

#[test]
fn test_non_groupable_column_is_rejected() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let err = TableCalculator::new(&rows, &registry, &options)
        .calculate(&grouped(&["name"]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Column cannot be grouped: name");
}
