//! FILENAME: core/table-export/src/lib.rs
//! CSV export of the records a table view currently shows.

pub mod csv_export;
pub mod error;

pub use csv_export::{export_csv, export_file_name, CsvOptions};
pub use error::ExportError;
