//! FILENAME: core/table-engine/tests/test_sort.rs
//! PURPOSE: Tests for multi-key sorting of records and groups.

mod common;

use common::{employee_registry, employee_rows, ids};
use serde_json::json;
use table_engine::{
    ColumnDef, ColumnRegistry, GroupPath, GroupState, SortKey, SortState, TableCalculator, TableError,
    TableOptions, TableState, Value,
};

fn sorted_ids(keys: Vec<SortKey>) -> Vec<String> {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let state = TableState {
        sort_by: SortState::new(keys),
        ..TableState::default()
    };
    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
    ids(&rows, &calc.tree.all_leaf_rows())
}

#[test]
fn test_numbers_ascending_with_empty_last() {
    assert_eq!(sorted_ids(vec![SortKey::asc("cost")]), vec!["2", "1", "5", "3", "6", "4"]);
}

#[test]
fn test_numbers_descending_with_empty_still_last() {
    assert_eq!(sorted_ids(vec![SortKey::desc("cost")]), vec!["6", "3", "5", "1", "2", "4"]);
}

#[test]
fn test_equal_keys_keep_input_order() {
    assert_eq!(sorted_ids(vec![SortKey::asc("dept")]), vec!["1", "3", "2", "5", "4", "6"]);
    assert_eq!(sorted_ids(vec![SortKey::desc("dept")]), vec!["4", "2", "5", "1", "3", "6"]);
}

#[test]
fn test_secondary_key_breaks_ties() {
    let keys = vec![SortKey::asc("dept"), SortKey::desc("name")];
    assert_eq!(sorted_ids(keys), vec!["3", "1", "5", "2", "4", "6"]);
}

#[test]
fn test_no_sort_keeps_input_order() {
    assert_eq!(sorted_ids(Vec::new()), vec!["1", "2", "3", "4", "5", "6"]);
}

#[test]
fn test_text_sorts_alphanumerically() {
    let rows = records::rows_from_json(&json!([
        { "code": "item10" },
        { "code": "item2" },
        { "code": "Item3" },
        { "code": "item1" }
    ]))
    .unwrap();
    let registry = ColumnRegistry::new(vec![ColumnDef::new("code", "Code")]).unwrap();
    let options = TableOptions::default();
    let state = TableState {
        sort_by: SortState::new(vec![SortKey::asc("code")]),
        ..TableState::default()
    };

    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
    let codes: Vec<String> = calc
        .tree
        .all_leaf_rows()
        .iter()
        .map(|&i| rows[i].get("code").to_string())
        .collect();
    assert_eq!(codes, vec!["Item3", "item1", "item2", "item10"]);
}

#[test]
fn test_mixed_kinds_order_numbers_text_booleans() {
    let rows = records::rows_from_json(&json!([
        { "v": true },
        { "v": "abc" },
        { "v": null },
        { "v": 7 }
    ]))
    .unwrap();
    let registry = ColumnRegistry::new(vec![ColumnDef::new("v", "V")]).unwrap();
    let options = TableOptions::default();
    let state = TableState {
        sort_by: SortState::new(vec![SortKey::asc("v")]),
        ..TableState::default()
    };

    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
    assert_eq!(calc.tree.all_leaf_rows(), vec![3, 1, 0, 2]);
}

#[test]
fn test_groups_sort_by_aggregate() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let state = TableState {
        group_by: GroupState::new(vec!["dept".to_string()]),
        sort_by: SortState::new(vec![SortKey::desc("cost")]),
        ..TableState::default()
    };

    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
    let order: Vec<Value> = calc
        .tree
        .roots()
        .iter()
        .map(|&id| calc.tree.node(id).as_group().unwrap().value.clone())
        .collect();
    // Midpoints: blank 40, A 20, B 10, C 0.
    assert_eq!(order, vec![Value::Empty, Value::text("A"), Value::text("B"), Value::text("C")]);

    // Records inside a group are sorted too.
    let a = calc.tree.find(&GroupPath::from_pairs([("dept", "A")])).unwrap();
    assert_eq!(ids(&rows, &calc.tree.leaf_rows(a)), vec!["3", "1"]);
}

#[test]
fn test_groups_sort_by_their_own_value() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let state = TableState {
        group_by: GroupState::new(vec!["dept".to_string()]),
        sort_by: SortState::new(vec![SortKey::desc("dept")]),
        ..TableState::default()
    };

    let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
    let order: Vec<Value> = calc
        .tree
        .roots()
        .iter()
        .map(|&id| calc.tree.node(id).as_group().unwrap().value.clone())
        .collect();
    assert_eq!(order, vec![Value::text("C"), Value::text("B"), Value::text("A"), Value::Empty]);
}

#[test]
fn test_unknown_sort_column_is_rejected() {
    let rows = employee_rows();
    let registry = employee_registry();
    let options = TableOptions::default();
    let state = TableState {
        sort_by: SortState::new(vec![SortKey::asc("salary")]),
        ..TableState::default()
    };
    let err = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap_err();
    assert!(err.is_invalid_column_reference());
    assert!(!matches!(err, TableError::DuplicateSortColumn(_)));
}

#[test]
fn test_groups_fall_back_to_their_value_without_an_aggregate() {
    let rows = records::rows_from_json(&json!([
        { "dept": "B", "name": "Bo" },
        { "dept": "A", "name": "Ann" },
        { "dept": "C", "name": "Cy" }
    ]))
    .unwrap();
    let registry = ColumnRegistry::new(vec![
        ColumnDef::new("dept", "Department").groupable(),
        ColumnDef::new("name", "Name"),
    ])
    .unwrap();
    let options = TableOptions::default();

    let root_values = |keys: Vec<SortKey>| -> Vec<Value> {
        let state = TableState {
            group_by: GroupState::new(vec!["dept".to_string()]),
            sort_by: SortState::new(keys),
            ..TableState::default()
        };
        let calc = TableCalculator::new(&rows, &registry, &options).calculate(&state).unwrap();
        calc.tree
            .roots()
            .iter()
            .map(|&id| calc.tree.node(id).as_group().unwrap().value.clone())
            .collect()
    };

    assert_eq!(
        root_values(vec![SortKey::asc("name")]),
        vec![Value::text("A"), Value::text("B"), Value::text("C")]
    );
    assert_eq!(
        root_values(vec![SortKey::desc("name")]),
        vec![Value::text("C"), Value::text("B"), Value::text("A")]
    );
}
