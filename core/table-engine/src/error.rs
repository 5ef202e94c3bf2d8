//! FILENAME: core/table-engine/src/error.rs

use records::{FilterKind, RecordsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Records(#[from] RecordsError),

    #[error("Column cannot be filtered: {0}")]
    ColumnNotFilterable(String),

    #[error("Filter value for column {column} does not fit its {kind:?} filter")]
    FilterKindMismatch { column: String, kind: FilterKind },

    #[error("Column cannot be grouped: {0}")]
    ColumnNotGroupable(String),

    #[error("Column is grouped more than once: {0}")]
    DuplicateGroupColumn(String),

    #[error("Column is sorted more than once: {0}")]
    DuplicateSortColumn(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Page size must be positive")]
    InvalidPageSize,

    #[error("Invalid table options: {0}")]
    Config(#[from] serde_json::Error),
}

impl TableError {
    /// True when the request named a column that is not in the registry.
    pub fn is_invalid_column_reference(&self) -> bool {
        matches!(self, TableError::Records(RecordsError::InvalidColumnReference(_)))
    }
}
