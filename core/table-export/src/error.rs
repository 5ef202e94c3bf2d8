//! FILENAME: core/table-export/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unable to export empty datasets")]
    EmptyExport,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
