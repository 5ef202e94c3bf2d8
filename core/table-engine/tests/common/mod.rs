//! FILENAME: core/table-engine/tests/common/mod.rs
//! Fixtures shared by the table-engine integration tests.

#![allow(dead_code)]

use serde_json::json;
use table_engine::{
    AggregateKind, ColumnDef, ColumnRegistry, FilterKind, Row, TableController, TableOptions,
};

/// Six employees. Dee has no cost, Finn has no department.
///
/// | pos | id | name | dept | site  | cost |
/// |-----|----|------|------|-------|------|
/// | 0   | 1  | Ann  | A    | North | 10   |
/// | 1   | 2  | Bo   | B    | South | 5    |
/// | 2   | 3  | Cy   | A    | South | 30   |
/// | 3   | 4  | Dee  | C    | North |      |
/// | 4   | 5  | Eve  | B    | North | 15   |
/// | 5   | 6  | Finn |      | South | 40   |
pub fn employee_rows() -> Vec<Row> {
    records::rows_from_json(&json!([
        { "id": 1, "name": "Ann",  "dept": "A",  "site": "North", "cost": 10 },
        { "id": 2, "name": "Bo",   "dept": "B",  "site": "South", "cost": 5 },
        { "id": 3, "name": "Cy",   "dept": "A",  "site": "South", "cost": 30 },
        { "id": 4, "name": "Dee",  "dept": "C",  "site": "North", "cost": null },
        { "id": 5, "name": "Eve",  "dept": "B",  "site": "North", "cost": 15 },
        { "id": 6, "name": "Finn", "dept": null, "site": "South", "cost": 40 }
    ]))
    .unwrap()
}

pub fn employee_registry() -> ColumnRegistry {
    ColumnRegistry::new(vec![
        ColumnDef::new("id", "ID")
            .with_filter(FilterKind::None)
            .with_aggregate(AggregateKind::Count),
        ColumnDef::new("name", "Name"),
        ColumnDef::new("dept", "Department")
            .with_filter(FilterKind::ExactSelect)
            .groupable(),
        ColumnDef::new("site", "Site")
            .with_filter(FilterKind::ExactSelect)
            .groupable(),
        ColumnDef::new("cost", "Cost")
            .with_filter(FilterKind::NumericRange)
            .with_aggregate(AggregateKind::RangeMidpoint),
    ])
    .unwrap()
}

/// `count` records with a single numeric column `n` holding 0..count.
pub fn sequence_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| Row::from_pairs(i, [("n", i as i64)]))
        .collect()
}

pub fn sequence_registry() -> ColumnRegistry {
    ColumnRegistry::new(vec![ColumnDef::new("n", "N").with_filter(FilterKind::NumericRange)]).unwrap()
}

/// Row positions of `rows` as record ids, for readable assertions.
pub fn ids(rows: &[Row], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| rows[i].id().to_string()).collect()
}

/// Controller harness.
pub struct TestHarness {
    pub table: TableController,
}

impl TestHarness {
    pub fn with_employees() -> Self {
        TestHarness {
            table: TableController::new(employee_rows(), employee_registry(), TableOptions::default())
                .unwrap(),
        }
    }

    pub fn with_sequence(count: usize) -> Self {
        TestHarness {
            table: TableController::new(sequence_rows(count), sequence_registry(), TableOptions::default())
                .unwrap(),
        }
    }
}
