//! FILENAME: core/records/src/column.rs
//! Column definitions and the column registry.
//!
//! A column declares which record field it reads and what the view may do
//! with it: how it is filtered, how it is aggregated inside a group, and
//! whether rows may be grouped by it. The registry is immutable once built
//! and its order is the default display and export order.

use crate::error::RecordsError;
use crate::row::Row;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a column within a registry.
pub type ColumnId = String;

// ============================================================================
// CAPABILITIES
// ============================================================================

/// How a column's filter input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Case-insensitive "starts with".
    Text,
    /// Exact match against one of the column's distinct values.
    ExactSelect,
    /// Inclusive `[min, max]` range, either side optional.
    NumericRange,
    /// Approximate relevance match.
    Fuzzy,
    /// Column cannot be filtered.
    None,
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::Text
    }
}

/// Summary computed over a group's leaf values for this column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateKind {
    None,
    /// Number of leaf rows under the group.
    Count,
    /// `round((min + max) / 2)` over the numeric leaf values. This is a cheap
    /// proxy for the middle of the range, not a median.
    RangeMidpoint,
}

impl Default for AggregateKind {
    fn default() -> Self {
        AggregateKind::None
    }
}

// ============================================================================
// COLUMN DEFINITION
// ============================================================================

/// Declares one column of a table view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub id: ColumnId,

    /// Label shown in the header and used as the CSV header.
    pub header: String,

    /// Record field the column reads. Defaults to the column id.
    #[serde(default)]
    pub accessor: Option<String>,

    #[serde(default)]
    pub filter_kind: FilterKind,

    #[serde(default)]
    pub aggregate_kind: AggregateKind,

    #[serde(default)]
    pub groupable: bool,
}

impl ColumnDef {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        ColumnDef {
            id: id.into(),
            header: header.into(),
            accessor: None,
            filter_kind: FilterKind::Text,
            aggregate_kind: AggregateKind::None,
            groupable: false,
        }
    }

    pub fn with_accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }

    pub fn with_filter(mut self, kind: FilterKind) -> Self {
        self.filter_kind = kind;
        self
    }

    pub fn with_aggregate(mut self, kind: AggregateKind) -> Self {
        self.aggregate_kind = kind;
        self
    }

    pub fn groupable(mut self) -> Self {
        self.groupable = true;
        self
    }

    /// The record field this column reads.
    pub fn field(&self) -> &str {
        self.accessor.as_deref().unwrap_or(&self.id)
    }

    /// Reads this column's value from a record.
    pub fn value<'r>(&self, row: &'r Row) -> &'r Value {
        row.get(self.field())
    }

    pub fn can_filter(&self) -> bool {
        self.filter_kind != FilterKind::None
    }

    pub fn has_aggregate(&self) -> bool {
        self.aggregate_kind != AggregateKind::None
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Ordered, immutable set of column definitions with unique ids.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDef>,
    positions: HashMap<ColumnId, usize>,
}

impl ColumnRegistry {
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, RecordsError> {
        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if positions.insert(column.id.clone(), idx).is_some() {
                return Err(RecordsError::DuplicateColumn(column.id.clone()));
            }
        }
        Ok(ColumnRegistry { columns, positions })
    }

    /// Looks up a column, failing with `InvalidColumnReference` when absent.
    pub fn get(&self, id: &str) -> Result<&ColumnDef, RecordsError> {
        self.positions
            .get(id)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| RecordsError::InvalidColumnReference(id.to_string()))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDef> {
        self.columns.iter()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Header labels in registry order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnRegistry {
    type Item = &'a ColumnDef;
    type IntoIter = std::slice::Iter<'a, ColumnDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
