//! FILENAME: core/table-engine/src/engine.rs
//! Table Engine - runs the full pipeline for one state snapshot.
//!
//! Pipeline:
//! 1. Validate the request (filters, grouping and sort columns).
//! 2. Filter the records (column filters, then the global search).
//! 3. Build the group tree.
//! 4. Aggregate every group.
//! 5. Sort the siblings of every level.
//! 6. Apply the expansion state and flatten into the visible sequence.
//!
//! Every step runs to completion and the result depends only on the inputs.
//! All validation happens before any work, so a rejected request produces no
//! partial result.

use records::{ColumnDef, ColumnId, ColumnRegistry, Row};

use crate::aggregate::aggregate_tree;
use crate::definition::{PageState, RowIndex, SortKey, TableOptions, TableState};
use crate::error::TableError;
use crate::filter::FilterSet;
use crate::group::RowTree;
use crate::logging::{log_debug, log_enter, log_exit};
use crate::sort::{sort_tree, ResolvedSortKey};
use crate::view::{flatten, paginate, render_row, DisplayNode, TableView};

/// The result of one pipeline run, before pagination.
#[derive(Debug, Clone)]
pub struct Calculation {
    /// Records passing every filter, in input order.
    pub filtered: Vec<RowIndex>,
    /// Number of records passing the column filters alone.
    pub pre_global_count: usize,
    pub tree: RowTree,
    pub visible: Vec<DisplayNode>,
    pub sort_by: Vec<SortKey>,
}

impl Calculation {
    /// Size of the result that page resets react to: the filtered record
    /// count and the number of top-level nodes.
    pub fn shape(&self) -> (usize, usize) {
        (self.filtered.len(), self.tree.roots().len())
    }

    /// Renders the requested page.
    pub fn render(
        &self,
        page: &PageState,
        rows: &[Row],
        registry: &ColumnRegistry,
        options: &TableOptions,
    ) -> TableView {
        let page = paginate(&self.visible, page);
        let view_rows = page
            .rows
            .iter()
            .map(|node| render_row(node, &self.tree, rows, registry, options))
            .collect();

        TableView {
            rows: view_rows,
            page_index: page.page_index,
            page_size: page.page_size,
            page_count: page.page_count,
            can_go_prev: page.can_go_prev,
            can_go_next: page.can_go_next,
            total_visible: page.total_rows,
            filtered_count: self.filtered.len(),
            pre_global_filtered_count: self.pre_global_count,
            group_by: self.tree.group_by().to_vec(),
            sort_by: self.sort_by.clone(),
        }
    }
}

/// Runs the pipeline over one record snapshot.
pub struct TableCalculator<'a> {
    rows: &'a [Row],
    registry: &'a ColumnRegistry,
    options: &'a TableOptions,
}

impl<'a> TableCalculator<'a> {
    pub fn new(rows: &'a [Row], registry: &'a ColumnRegistry, options: &'a TableOptions) -> Self {
        TableCalculator { rows, registry, options }
    }

    /// Checks `state` against the registry without running the pipeline.
    pub fn validate(&self, state: &TableState) -> Result<(), TableError> {
        FilterSet::compile(self.registry, &state.filters, self.options)?;
        self.resolve_group_columns(&state.group_by.columns)?;
        self.resolve_sort_keys(&state.sort_by.keys)?;
        Ok(())
    }

    /// Runs every stage for `state`.
    pub fn calculate(&self, state: &TableState) -> Result<Calculation, TableError> {
        log_enter!(
            "ENGINE",
            "calculate",
            "rows={} group_by={:?} sort_keys={}",
            self.rows.len(),
            state.group_by.columns,
            state.sort_by.keys.len()
        );

        let filters = FilterSet::compile(self.registry, &state.filters, self.options)?;
        let group_columns = self.resolve_group_columns(&state.group_by.columns)?;
        let sort_keys = self.resolve_sort_keys(&state.sort_by.keys)?;

        let column_filtered = filters.apply_columns(self.rows);
        let pre_global_count = column_filtered.len();
        let filtered = filters.apply_global(self.rows, &column_filtered);
        log_debug!(
            "FILTER",
            "{} of {} rows pass, {} before global search",
            filtered.len(),
            self.rows.len(),
            pre_global_count
        );

        let mut tree = RowTree::build(self.rows, &filtered, &group_columns);
        aggregate_tree(&mut tree, self.rows, self.registry);
        sort_tree(&mut tree, self.rows, &sort_keys);
        tree.apply_expansion(&state.expansion);
        let visible = flatten(&tree, self.rows);

        log_exit!(
            "ENGINE",
            "calculate",
            "filtered={} groups={} visible={}",
            filtered.len(),
            tree.group_count(),
            visible.len()
        );

        Ok(Calculation {
            filtered,
            pre_global_count,
            tree,
            visible,
            sort_by: state.sort_by.keys.clone(),
        })
    }

    fn resolve_group_columns(&self, columns: &[ColumnId]) -> Result<Vec<&'a ColumnDef>, TableError> {
        let mut resolved: Vec<&'a ColumnDef> = Vec::with_capacity(columns.len());
        for id in columns {
            let column = self.registry.get(id)?;
            if !column.groupable {
                return Err(TableError::ColumnNotGroupable(id.clone()));
            }
            if resolved.iter().any(|c| c.id == column.id) {
                return Err(TableError::DuplicateGroupColumn(id.clone()));
            }
            resolved.push(column);
        }
        Ok(resolved)
    }

    fn resolve_sort_keys(&self, keys: &[SortKey]) -> Result<Vec<ResolvedSortKey<'a>>, TableError> {
        let mut resolved: Vec<ResolvedSortKey<'a>> = Vec::with_capacity(keys.len());
        for key in keys {
            let column = self.registry.get(&key.column_id)?;
            if resolved.iter().any(|k| k.column.id == column.id) {
                return Err(TableError::DuplicateSortColumn(key.column_id.clone()));
            }
            resolved.push(ResolvedSortKey {
                column,
                descending: key.descending,
            });
        }
        Ok(resolved)
    }
}

/// Runs the pipeline for `state` and renders its page in one call.
pub fn calculate_view(
    rows: &[Row],
    registry: &ColumnRegistry,
    options: &TableOptions,
    state: &TableState,
) -> Result<TableView, TableError> {
    let calculation = TableCalculator::new(rows, registry, options).calculate(state)?;
    Ok(calculation.render(&state.page, rows, registry, options))
}
