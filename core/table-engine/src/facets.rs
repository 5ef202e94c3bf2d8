//! FILENAME: core/table-engine/src/facets.rs
// PURPOSE: Candidate values and hints offered by a column's filter input.
// CONTEXT: A column's options are computed over the records that pass every
//          *other* active column filter, so narrowing one column narrows the
//          choices offered for the others (cross-filtering). The global
//          search is applied after column filters and does not narrow them.

use records::{ColumnRegistry, Row, Value};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::definition::{FilterState, TableOptions};
use crate::error::TableError;
use crate::filter::FilterSet;

/// What a filter input for one column can offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub column_id: String,

    /// Distinct non-empty values, in first-seen order.
    pub candidates: Vec<Value>,

    /// Smallest and largest numeric value, for range inputs.
    pub range_hint: Option<(f64, f64)>,

    /// Number of records the options were computed from.
    pub pre_filtered_count: usize,
}

/// Computes the filter options of `column_id` under `state`.
pub fn filter_options(
    rows: &[Row],
    registry: &ColumnRegistry,
    state: &FilterState,
    options: &TableOptions,
    column_id: &str,
) -> Result<FilterOptions, TableError> {
    let column = registry.get(column_id)?;
    let filters = FilterSet::compile(registry, state, options)?;
    let indices = filters.apply_except(rows, column_id);

    let mut seen: FxHashSet<&Value> = FxHashSet::default();
    let mut candidates = Vec::new();
    let mut range_hint: Option<(f64, f64)> = None;

    for &idx in &indices {
        let value = column.value(&rows[idx]);
        if value.is_empty() {
            continue;
        }
        if seen.insert(value) {
            candidates.push(value.clone());
        }
        if let Some(n) = value.to_number() {
            range_hint = Some(match range_hint {
                Some((lo, hi)) => (lo.min(n), hi.max(n)),
                None => (n, n),
            });
        }
    }

    Ok(FilterOptions {
        column_id: column.id.clone(),
        candidates,
        range_hint,
        pre_filtered_count: indices.len(),
    })
}
