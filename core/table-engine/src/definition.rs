//! FILENAME: core/table-engine/src/definition.rs
//! Table Definition - The explicit state snapshots that drive the pipeline.
//!
//! This module contains all the types needed to DESCRIBE what a table view
//! should show. These structures are designed to be:
//! - Serializable (sent across the UI bridge, saved as view presets)
//! - Cheap to clone (the controller edits a copy and commits it only when
//!   the recalculation succeeds)
//! - Pure data: no references into the record snapshot

use std::fmt;

use records::{ColumnId, Value};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::TableError;
use crate::fuzzy::MatchRank;

/// Position of a record within the caller's snapshot.
pub type RowIndex = usize;

// ============================================================================
// FILTER STATE
// ============================================================================

/// The value of one column filter. The shape depends on the column's filter
/// kind: a scalar string for text/exact/fuzzy filters, a `[min, max]` pair
/// for numeric ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    /// Raw bounds as entered. Bounds that are not numeric are treated as
    /// unset when the filter is applied.
    Range(Option<Value>, Option<Value>),
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range(min.map(Value::Number), max.map(Value::Number))
    }

    /// An empty filter value places no constraint on its column.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Range(min, max) => is_blank_bound(min) && is_blank_bound(max),
        }
    }
}

fn is_blank_bound(bound: &Option<Value>) -> bool {
    match bound {
        None | Some(Value::Empty) => true,
        Some(Value::Text(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// One active column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub column_id: ColumnId,
    pub value: FilterValue,
}

/// All active filters of a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Column filters in the order they were first set.
    #[serde(default)]
    pub columns: Vec<ColumnFilter>,

    /// Global fuzzy search string.
    #[serde(default)]
    pub global: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter of a column. An empty value removes the filter, which
    /// is the same as never having set it.
    pub fn set(&mut self, column_id: &str, value: FilterValue) {
        if value.is_empty() {
            self.clear(column_id);
            return;
        }
        match self.columns.iter_mut().find(|f| f.column_id == column_id) {
            Some(existing) => existing.value = value,
            None => self.columns.push(ColumnFilter {
                column_id: column_id.to_string(),
                value,
            }),
        }
    }

    /// Removes the filter of a column. Clearing an absent filter is a no-op.
    pub fn clear(&mut self, column_id: &str) {
        self.columns.retain(|f| f.column_id != column_id);
    }

    pub fn get(&self, column_id: &str) -> Option<&FilterValue> {
        self.columns
            .iter()
            .find(|f| f.column_id == column_id)
            .map(|f| &f.value)
    }

    /// Sets the global search. `None` or an empty string removes it.
    pub fn set_global(&mut self, query: Option<String>) {
        self.global = query.filter(|q| !q.is_empty());
    }

    pub fn global(&self) -> Option<&str> {
        self.global.as_deref().filter(|q| !q.is_empty())
    }

    pub fn clear_all(&mut self) {
        self.columns.clear();
        self.global = None;
    }

    /// True when no column filter and no global search is active.
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|f| f.value.is_empty()) && self.global().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnFilter> {
        self.columns.iter().filter(|f| !f.value.is_empty())
    }
}

// ============================================================================
// GROUP STATE
// ============================================================================

/// Ordered grouping columns. The first column is the root grouping level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupState {
    pub columns: Vec<ColumnId>,
}

impl GroupState {
    pub fn new(columns: Vec<ColumnId>) -> Self {
        GroupState { columns }
    }

    /// Adds the column as the innermost grouping level, or removes it if it
    /// is already grouped.
    pub fn toggle(&mut self, column_id: &str) {
        if self.contains(column_id) {
            self.columns.retain(|c| c != column_id);
        } else {
            self.columns.push(column_id.to_string());
        }
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.columns.iter().any(|c| c == column_id)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

// ============================================================================
// SORT STATE
// ============================================================================

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub column_id: ColumnId,
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column_id: impl Into<String>) -> Self {
        SortKey { column_id: column_id.into(), descending: false }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        SortKey { column_id: column_id.into(), descending: true }
    }
}

/// Ordered sort keys; the first key is the primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState {
    pub keys: Vec<SortKey>,
}

impl SortState {
    pub fn new(keys: Vec<SortKey>) -> Self {
        SortState { keys }
    }

    /// Cycles a column through ascending, descending and unsorted.
    ///
    /// Without `multi` the column becomes the only sort key; with `multi` it
    /// is appended to (or updated within) the existing keys.
    pub fn toggle(&mut self, column_id: &str, multi: bool) {
        let existing = self.keys.iter().position(|k| k.column_id == column_id);

        match existing {
            None => {
                if !multi {
                    self.keys.clear();
                }
                self.keys.push(SortKey::asc(column_id));
            }
            Some(idx) if !self.keys[idx].descending => {
                if !multi {
                    self.keys.retain(|k| k.column_id == column_id);
                }
                if let Some(key) = self.keys.iter_mut().find(|k| k.column_id == column_id) {
                    key.descending = true;
                }
            }
            Some(_) => {
                if multi {
                    self.keys.retain(|k| k.column_id != column_id);
                } else {
                    self.keys.clear();
                }
            }
        }
    }

    pub fn get(&self, column_id: &str) -> Option<&SortKey> {
        self.keys.iter().find(|k| k.column_id == column_id)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ============================================================================
// GROUP IDENTITY & EXPANSION
// ============================================================================

/// One step of a group path: the grouping column and the group's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub column_id: ColumnId,
    pub value: Value,
}

/// Identity of a group node: the `(column, value)` pairs from the root down
/// to the group. Stays the same across recalculations as long as the same
/// values recur.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupPath(pub SmallVec<[PathSegment; 4]>);

impl GroupPath {
    pub fn root() -> Self {
        GroupPath(SmallVec::new())
    }

    /// Builds a path from `(column, value)` pairs, outermost first.
    pub fn from_pairs<C, V, I>(pairs: I) -> Self
    where
        C: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (C, V)>,
    {
        GroupPath(
            pairs
                .into_iter()
                .map(|(c, v)| PathSegment { column_id: c.into(), value: v.into() })
                .collect(),
        )
    }

    /// Returns a new path one level deeper.
    pub fn child(&self, column_id: &str, value: Value) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment { column_id: column_id.to_string(), value });
        GroupPath(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Value of the segment for `column_id`, if the path passes through it.
    pub fn value_for(&self, column_id: &str) -> Option<&Value> {
        self.0.iter().find(|s| s.column_id == column_id).map(|s| &s.value)
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}:{}", segment.column_id, segment.value)?;
        }
        Ok(())
    }
}

/// Expanded group paths. Groups not listed here are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: FxHashSet<GroupPath>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &GroupPath) -> bool {
        self.expanded.contains(path)
    }

    pub fn set_expanded(&mut self, path: GroupPath, expanded: bool) {
        if expanded {
            self.expanded.insert(path);
        } else {
            self.expanded.remove(&path);
        }
    }

    /// Flips the expansion of a group and returns the new state.
    pub fn toggle(&mut self, path: &GroupPath) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.clone());
            true
        }
    }

    /// Forgets paths for which `exists` returns false.
    pub fn retain<F: Fn(&GroupPath) -> bool>(&mut self, exists: F) {
        self.expanded.retain(|p| exists(p));
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

// ============================================================================
// PAGE STATE
// ============================================================================

/// Requested page of the visible sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_index: usize, page_size: usize) -> Result<Self, TableError> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        Ok(PageState { page_index, page_size })
    }
}

impl Default for PageState {
    fn default() -> Self {
        PageState { page_index: 0, page_size: DEFAULT_PAGE_SIZE }
    }
}

// ============================================================================
// TABLE STATE
// ============================================================================

/// Everything the user can change about a view, in one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    pub filters: FilterState,
    pub group_by: GroupState,
    pub sort_by: SortState,
    pub expansion: ExpansionState,
    pub page: PageState,
}

// ============================================================================
// OPTIONS
// ============================================================================

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// View configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Page size of a freshly created view.
    pub initial_page_size: usize,

    /// Page sizes offered by the page size selector.
    pub page_size_options: Vec<usize>,

    /// Lowest rank a fuzzy match needs to keep a row.
    pub fuzzy_threshold: MatchRank,

    /// Jump back to the first page when the filtered or grouped row set
    /// changes size.
    pub auto_reset_page: bool,

    /// Leaf cell text longer than this is truncated with an ellipsis.
    pub max_cell_chars: usize,

    /// Label shown for the group of empty values.
    pub blank_label: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            initial_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 20, 30, 40, 50],
            fuzzy_threshold: MatchRank::Matches,
            auto_reset_page: true,
            max_cell_chars: 50,
            blank_label: "(blank)".to_string(),
        }
    }
}

impl TableOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let options: TableOptions = serde_json::from_str(json)?;
        if options.initial_page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        Ok(options)
    }

    pub fn initial_page(&self) -> Result<PageState, TableError> {
        PageState::new(0, self.initial_page_size)
    }
}
