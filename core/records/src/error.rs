//! FILENAME: core/records/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordsError {
    #[error("Unknown column: {0}")]
    InvalidColumnReference(String),

    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    #[error("Invalid record at position {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },
}
