//! FILENAME: core/table-engine/src/controller.rs
//! Table Controller - owns one view's state and keeps its rendered page current.
//!
//! Every mutation works on a copy of the state: the copy is edited, the
//! pipeline runs on it, and only a successful run is committed. A rejected
//! request therefore leaves both the state and the last view untouched.
//!
//! Page-only operations (moving between pages, changing the page size) reuse
//! the last pipeline result and only re-slice it.

use records::{ColumnId, ColumnRegistry, Row};
use table_export::{export_csv, CsvOptions, ExportError};

use crate::definition::{
    ExpansionState, FilterValue, GroupPath, GroupState, PageState, SortKey, SortState, TableOptions,
    TableState,
};
use crate::engine::{Calculation, TableCalculator};
use crate::error::TableError;
use crate::facets::{filter_options, FilterOptions};
use crate::logging::{log_debug, log_enter, log_exit, log_info};
use crate::view::{clamp_page_index, page_count, TableView};

pub struct TableController {
    rows: Vec<Row>,
    registry: ColumnRegistry,
    options: TableOptions,
    state: TableState,
    calculation: Calculation,
    view: TableView,
}

impl TableController {
    /// Creates a controller showing the first page of `rows` with no
    /// filter, grouping or sort.
    pub fn new(rows: Vec<Row>, registry: ColumnRegistry, options: TableOptions) -> Result<Self, TableError> {
        let state = TableState {
            page: options.initial_page()?,
            ..TableState::default()
        };
        let calculation = TableCalculator::new(&rows, &registry, &options).calculate(&state)?;
        let view = calculation.render(&state.page, &rows, &registry, &options);

        log_info!(
            "CONTROLLER",
            "created view over {} row(s), {} column(s)",
            rows.len(),
            registry.len()
        );

        Ok(TableController {
            rows,
            registry,
            options,
            state,
            calculation,
            view,
        })
    }

    // ========================================================================
    // ACCESS
    // ========================================================================

    /// The current page.
    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Page sizes offered to the user.
    pub fn page_size_options(&self) -> &[usize] {
        &self.options.page_size_options
    }

    /// Records passing every filter, in input order.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.calculation.filtered.iter().map(move |&idx| &self.rows[idx])
    }

    pub fn filtered_count(&self) -> usize {
        self.calculation.filtered.len()
    }

    /// Candidate values and range hints for a column's filter input.
    pub fn filter_options(&self, column_id: &str) -> Result<FilterOptions, TableError> {
        filter_options(&self.rows, &self.registry, &self.state.filters, &self.options, column_id)
    }

    /// Exports the filtered records as CSV, in input order.
    pub fn export_csv(&self, options: &CsvOptions) -> Result<String, ExportError> {
        export_csv(self.filtered_rows(), &self.registry, options)
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    /// Replaces the record snapshot and recalculates with the current state.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<&TableView, TableError> {
        log_enter!("CONTROLLER", "replace_rows", "rows={}", rows.len());
        let state = self.state.clone();
        let calculation = TableCalculator::new(&rows, &self.registry, &self.options).calculate(&state)?;
        self.rows = rows;
        self.commit(state, calculation);
        log_exit!("CONTROLLER", "replace_rows");
        Ok(&self.view)
    }

    // ========================================================================
    // FILTERS
    // ========================================================================

    /// Sets a column filter. An empty value removes it.
    pub fn set_filter(&mut self, column_id: &str, value: FilterValue) -> Result<&TableView, TableError> {
        self.registry.get(column_id)?;
        self.update("set_filter", |state| {
            state.filters.set(column_id, value);
            Ok(())
        })
    }

    pub fn clear_filter(&mut self, column_id: &str) -> Result<&TableView, TableError> {
        self.registry.get(column_id)?;
        self.update("clear_filter", |state| {
            state.filters.clear(column_id);
            Ok(())
        })
    }

    /// Removes every column filter and the global search.
    pub fn clear_all_filters(&mut self) -> Result<&TableView, TableError> {
        self.update("clear_all_filters", |state| {
            state.filters.clear_all();
            Ok(())
        })
    }

    pub fn set_global_filter(&mut self, query: Option<String>) -> Result<&TableView, TableError> {
        self.update("set_global_filter", |state| {
            state.filters.set_global(query);
            Ok(())
        })
    }

    // ========================================================================
    // GROUPING & SORTING
    // ========================================================================

    pub fn set_group_by(&mut self, columns: Vec<ColumnId>) -> Result<&TableView, TableError> {
        self.update("set_group_by", |state| {
            state.group_by = GroupState::new(columns);
            Ok(())
        })
    }

    /// Adds a column as the innermost grouping level, or removes it.
    pub fn toggle_group_by(&mut self, column_id: &str) -> Result<&TableView, TableError> {
        self.update("toggle_group_by", |state| {
            state.group_by.toggle(column_id);
            Ok(())
        })
    }

    pub fn set_sort(&mut self, keys: Vec<SortKey>) -> Result<&TableView, TableError> {
        self.update("set_sort", |state| {
            state.sort_by = SortState::new(keys);
            Ok(())
        })
    }

    /// Cycles a column through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, column_id: &str, multi: bool) -> Result<&TableView, TableError> {
        self.registry.get(column_id)?;
        self.update("toggle_sort", |state| {
            state.sort_by.toggle(column_id, multi);
            Ok(())
        })
    }

    pub fn clear_sort(&mut self) -> Result<&TableView, TableError> {
        self.update("clear_sort", |state| {
            state.sort_by = SortState::default();
            Ok(())
        })
    }

    // ========================================================================
    // EXPANSION
    // ========================================================================

    /// Expands a collapsed group or collapses an expanded one.
    pub fn toggle_expanded(&mut self, path: &GroupPath) -> Result<&TableView, TableError> {
        if !self.calculation.tree.contains_path(path) {
            return Err(TableError::UnknownGroup(path.to_string()));
        }
        self.update("toggle_expanded", |state| {
            state.expansion.toggle(path);
            Ok(())
        })
    }

    /// Expands or collapses every group of the current tree.
    pub fn set_all_expanded(&mut self, expanded: bool) -> Result<&TableView, TableError> {
        let paths: Vec<GroupPath> = if expanded {
            self.calculation.tree.group_paths().cloned().collect()
        } else {
            Vec::new()
        };
        self.update("set_all_expanded", |state| {
            state.expansion = ExpansionState::new();
            for path in paths {
                state.expansion.set_expanded(path, true);
            }
            Ok(())
        })
    }

    // ========================================================================
    // PAGINATION
    // ========================================================================

    /// Shows page `page_index`, clamped to the last page.
    pub fn goto_page(&mut self, page_index: usize) -> &TableView {
        let page = PageState {
            page_index,
            page_size: self.state.page.page_size,
        };
        self.repage(page)
    }

    pub fn next_page(&mut self) -> &TableView {
        let index = if self.view.can_go_next {
            self.view.page_index + 1
        } else {
            self.view.page_index
        };
        self.goto_page(index)
    }

    pub fn previous_page(&mut self) -> &TableView {
        let index = self.view.page_index.saturating_sub(1);
        self.goto_page(index)
    }

    pub fn first_page(&mut self) -> &TableView {
        self.goto_page(0)
    }

    pub fn last_page(&mut self) -> &TableView {
        let index = self.view.page_count.saturating_sub(1);
        self.goto_page(index)
    }

    /// Changes the page size, keeping the first row of the current page on
    /// screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<&TableView, TableError> {
        let first_row = self.view.page_index * self.state.page.page_size;
        let page = PageState::new(first_row / page_size.max(1), page_size)?;
        Ok(self.repage(page))
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Applies `edit` to a copy of the state and commits it if the pipeline
    /// accepts it.
    fn update<F>(&mut self, op: &str, edit: F) -> Result<&TableView, TableError>
    where
        F: FnOnce(&mut TableState) -> Result<(), TableError>,
    {
        log_enter!("CONTROLLER", op);

        let mut next = self.state.clone();
        edit(&mut next)?;
        if next == self.state {
            log_exit!("CONTROLLER", op, "unchanged");
            return Ok(&self.view);
        }

        let calculation = TableCalculator::new(&self.rows, &self.registry, &self.options).calculate(&next)?;
        self.commit(next, calculation);

        log_exit!(
            "CONTROLLER",
            op,
            "filtered={} page={}/{}",
            self.view.filtered_count,
            self.view.page_index,
            self.view.page_count
        );
        Ok(&self.view)
    }

    fn commit(&mut self, mut state: TableState, calculation: Calculation) {
        // Vanished groups forget their expansion.
        let tree = &calculation.tree;
        state.expansion.retain(|path| tree.contains_path(path));

        if self.options.auto_reset_page && calculation.shape() != self.calculation.shape() {
            log_debug!("CONTROLLER", "row set changed shape, back to first page");
            state.page.page_index = 0;
        }

        self.calculation = calculation;
        self.state = state;
        let page = self.state.page;
        self.repage(page);
    }

    fn repage(&mut self, page: PageState) -> &TableView {
        let count = page_count(self.calculation.visible.len(), page.page_size);
        self.state.page = PageState {
            page_index: clamp_page_index(page.page_index, count),
            page_size: page.page_size,
        };
        self.view = self
            .calculation
            .render(&self.state.page, &self.rows, &self.registry, &self.options);
        &self.view
    }
}
