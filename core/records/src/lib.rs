//! FILENAME: core/records/src/lib.rs
//! PURPOSE: Shared record and column types for the table view engine.
//! CONTEXT: Re-exports public types for use by `table-engine` and `table-export`.

pub mod column;
pub mod error;
pub mod row;
pub mod value;

// Re-export commonly used types at the crate root
pub use column::{AggregateKind, ColumnDef, ColumnId, ColumnRegistry, FilterKind};
pub use error::RecordsError;
pub use row::{rows_from_json, Row, RowId, ID_FIELD};
pub use value::Value;
