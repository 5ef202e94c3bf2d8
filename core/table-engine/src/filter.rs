//! FILENAME: core/table-engine/src/filter.rs
//! Filter Engine - keeps the records that satisfy every active filter.
//!
//! Filters are first compiled against the column registry. Compilation is
//! where requests are validated (unknown columns, unfilterable columns,
//! value shapes that do not fit the column's filter kind); applying a
//! compiled filter set is total and never fails.
//!
//! Column filters combine with AND, the global search then intersects the
//! result. The output keeps the relative order of the input records.

use records::{ColumnDef, ColumnRegistry, FilterKind, Row, Value};

use crate::definition::{FilterState, FilterValue, RowIndex, TableOptions};
use crate::error::TableError;
use crate::fuzzy::{self, MatchRank};
use crate::logging::{log_debug, log_warn};

// ============================================================================
// PREDICATES
// ============================================================================

/// A column filter resolved against its column definition.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// Lowercased prefix.
    Prefix(String),
    Exact(String),
    Range { min: Option<f64>, max: Option<f64> },
    Fuzzy(String),
}

impl Predicate {
    fn matches(&self, value: &Value, threshold: MatchRank) -> bool {
        match self {
            Predicate::Prefix(prefix) => {
                !value.is_empty() && value.to_string().to_lowercase().starts_with(prefix.as_str())
            }
            Predicate::Exact(expected) => !value.is_empty() && value.to_string() == *expected,
            Predicate::Range { min, max } => match value.to_number() {
                Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                None => false,
            },
            Predicate::Fuzzy(query) => fuzzy::is_match(query, &value.to_string(), threshold),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledFilter<'a> {
    column: &'a ColumnDef,
    predicate: Predicate,
}

// ============================================================================
// FILTER SET
// ============================================================================

/// Filters of one `FilterState`, validated and ready to apply.
#[derive(Debug, Clone)]
pub struct FilterSet<'a> {
    filters: Vec<CompiledFilter<'a>>,
    global: Option<String>,
    global_columns: Vec<&'a ColumnDef>,
    threshold: MatchRank,
}

impl<'a> FilterSet<'a> {
    /// Validates `state` against the registry and resolves every filter.
    pub fn compile(
        registry: &'a ColumnRegistry,
        state: &FilterState,
        options: &TableOptions,
    ) -> Result<Self, TableError> {
        let mut filters = Vec::new();

        for filter in state.iter() {
            let column = registry.get(&filter.column_id)?;
            if let Some(predicate) = compile_predicate(column, &filter.value)? {
                filters.push(CompiledFilter { column, predicate });
            }
        }

        let global_columns: Vec<&ColumnDef> = registry.iter().filter(|c| c.can_filter()).collect();

        Ok(FilterSet {
            filters,
            global: state.global().map(str::to_string),
            global_columns,
            threshold: options.fuzzy_threshold,
        })
    }

    /// Number of column filters that constrain the result.
    pub fn active_count(&self) -> usize {
        self.filters.len()
    }

    pub fn has_global(&self) -> bool {
        self.global.is_some()
    }

    /// Returns true if the record passes every column filter except the one
    /// on `skip_column`.
    fn passes_columns(&self, row: &Row, skip_column: Option<&str>) -> bool {
        self.filters
            .iter()
            .filter(|f| skip_column.map_or(true, |skip| f.column.id != skip))
            .all(|f| f.predicate.matches(f.column.value(row), self.threshold))
    }

    fn passes_global(&self, row: &Row) -> bool {
        match &self.global {
            None => true,
            Some(query) => self
                .global_columns
                .iter()
                .any(|c| fuzzy::is_match(query, &c.value(row).to_string(), self.threshold)),
        }
    }

    /// Applies the column filters only (the row set the global search runs on).
    pub fn apply_columns(&self, rows: &[Row]) -> Vec<RowIndex> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.passes_columns(row, None))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Narrows an already column-filtered row set by the global search.
    pub fn apply_global(&self, rows: &[Row], indices: &[RowIndex]) -> Vec<RowIndex> {
        if self.global.is_none() {
            return indices.to_vec();
        }
        indices
            .iter()
            .copied()
            .filter(|&idx| self.passes_global(&rows[idx]))
            .collect()
    }

    /// Applies every filter.
    pub fn apply(&self, rows: &[Row]) -> Vec<RowIndex> {
        let indices = self.apply_columns(rows);
        self.apply_global(rows, &indices)
    }

    /// Applies every column filter except the one on `column_id`. This is the
    /// row set a column's filter options are offered from.
    pub fn apply_except(&self, rows: &[Row], column_id: &str) -> Vec<RowIndex> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.passes_columns(row, Some(column_id)))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Resolves one filter value. Returns `None` when the value places no
/// constraint (e.g. a range whose bounds are both unusable).
fn compile_predicate(column: &ColumnDef, value: &FilterValue) -> Result<Option<Predicate>, TableError> {
    let mismatch = || TableError::FilterKindMismatch {
        column: column.id.clone(),
        kind: column.filter_kind,
    };

    let predicate = match (column.filter_kind, value) {
        (FilterKind::None, _) => return Err(TableError::ColumnNotFilterable(column.id.clone())),
        (FilterKind::Text, FilterValue::Text(s)) => Predicate::Prefix(s.to_lowercase()),
        (FilterKind::ExactSelect, FilterValue::Text(s)) => Predicate::Exact(s.clone()),
        (FilterKind::Fuzzy, FilterValue::Text(s)) => Predicate::Fuzzy(s.clone()),
        (FilterKind::NumericRange, FilterValue::Range(min, max)) => {
            let min = resolve_bound(column, "min", min);
            let max = resolve_bound(column, "max", max);
            if min.is_none() && max.is_none() {
                log_debug!("FILTER", "range on {} has no usable bound, ignored", column.id);
                return Ok(None);
            }
            Predicate::Range { min, max }
        }
        _ => return Err(mismatch()),
    };

    Ok(Some(predicate))
}

/// A bound that is not numeric is treated as unset.
fn resolve_bound(column: &ColumnDef, side: &str, bound: &Option<Value>) -> Option<f64> {
    match bound {
        None | Some(Value::Empty) => None,
        Some(Value::Text(s)) if s.trim().is_empty() => None,
        Some(v) => {
            let resolved = v.to_number();
            if resolved.is_none() {
                log_warn!(
                    "FILTER",
                    "malformed {} bound {:?} on {}, treated as unbounded",
                    side,
                    v,
                    column.id
                );
            }
            resolved
        }
    }
}

/// Filters `rows` by `state` and returns the indices of the passing rows in
/// input order.
pub fn filter_rows(
    rows: &[Row],
    registry: &ColumnRegistry,
    state: &FilterState,
    options: &TableOptions,
) -> Result<Vec<RowIndex>, TableError> {
    let filters = FilterSet::compile(registry, state, options)?;
    let result = filters.apply(rows);
    log_debug!(
        "FILTER",
        "{} of {} rows pass {} column filter(s), global={}",
        result.len(),
        rows.len(),
        filters.active_count(),
        filters.has_global()
    );
    Ok(result)
}
