//! FILENAME: core/table-engine/src/lib.rs
//! Table Engine - filter, group, aggregate, sort and paginate in-memory records.
//!
//! This crate turns a snapshot of records plus an explicit `TableState`
//! (filters, grouping, sort keys, expanded groups, page) into a `TableView`:
//! the rows of one page, each with one rendered cell per column.
//!
//! Architecture:
//! - `definition`: the state snapshots and options (pure data, serializable)
//! - `filter` / `fuzzy` / `facets`: record filtering and filter input options
//! - `group` / `aggregate` / `sort`: the grouped tree and its annotations
//! - `view`: flattening, pagination and cell rendering
//! - `engine`: runs the pipeline for one state snapshot
//! - `controller`: owns a view's state and applies user requests to it

pub mod aggregate;
pub mod controller;
pub mod definition;
pub mod engine;
pub mod error;
pub mod facets;
pub mod filter;
pub mod fuzzy;
pub mod group;
pub mod logging;
pub mod sort;
pub mod view;

pub use aggregate::{aggregate_tree, RangeAccumulator};
pub use controller::TableController;
pub use definition::{
    ColumnFilter, ExpansionState, FilterState, FilterValue, GroupPath, GroupState, PageState,
    PathSegment, RowIndex, SortKey, SortState, TableOptions, TableState, DEFAULT_PAGE_SIZE,
};
pub use engine::{calculate_view, Calculation, TableCalculator};
pub use error::TableError;
pub use facets::{filter_options, FilterOptions};
pub use filter::{filter_rows, FilterSet};
pub use fuzzy::MatchRank;
pub use group::{group_rows, GroupNode, LeafNode, NodeId, RowNode, RowTree};
pub use sort::{compare_alphanumeric, compare_values, sort_tree, ResolvedSortKey};
pub use view::{flatten, paginate, CellKind, DisplayNode, Page, TableView, ViewCell, ViewRow};

pub use records::{AggregateKind, ColumnDef, ColumnId, ColumnRegistry, FilterKind, Row, RowId, Value};
pub use table_export::{export_file_name, CsvOptions, ExportError};
