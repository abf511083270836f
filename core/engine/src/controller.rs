//! FILENAME: core/engine/src/controller.rs
//! PURPOSE: The table controller: single owner of interactive table state.
//! CONTEXT: Sorting, filtering, pagination, column visibility and row selection
//! live here as one state bundle. Derived views (filtered, sorted, paged rows;
//! totals; status) are recomputed on every read, never cached. The rendering
//! surface and the exporters only read from the controller.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::column::{ColumnSpec, RenderTarget, RenderedCell};
use crate::config::TableConfig;
use crate::detail::{detail_entries, DetailEntry};
use crate::error::{SchemaError, TableError};
use crate::notify::{Clock, Debouncer, SystemClock};
use crate::row_model::{RowModel, SortDirection, SortState};
use crate::schema::resolve_active_columns;

/// Callback receiving the currently selected rows.
pub type SelectionCallback<R> = Box<dyn FnMut(&[&R])>;

/// Business-rule veto on selecting a row.
pub type SelectablePredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

// ============================================================================
// STATE
// ============================================================================

/// Pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub index: usize,
    pub size: usize,
    /// When set, the page spans the whole dataset.
    pub show_all: bool,
}

/// Everything the user can change about a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableState {
    pub sort: Option<SortState>,
    pub filters: BTreeMap<String, String>,
    pub global_search: String,
    pub visibility: BTreeMap<String, bool>,
    /// Indices into the unfiltered dataset.
    pub selection: BTreeSet<usize>,
    pub page: PageState,
}

impl Default for PageState {
    fn default() -> Self {
        PageState {
            index: 0,
            size: 10,
            show_all: false,
        }
    }
}

/// What a rendering surface should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// At least one row passes the filters.
    Rows,
    /// Rows are loaded but none match the filters.
    NoMatches,
    /// The dataset is empty.
    Empty,
}

/// Result of a selection mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionChange {
    /// The selection set changed.
    pub changed: bool,
    /// Rows the selectable predicate refused.
    pub vetoed: Vec<usize>,
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct TableController<R> {
    schema: Vec<ColumnSpec<R>>,
    active: Vec<ColumnSpec<R>>,
    rows: Vec<R>,
    state: TableState,
    config: TableConfig,
    selectable: Option<SelectablePredicate<R>>,
    on_selection: Option<SelectionCallback<R>>,
    debouncer: Debouncer,
}

impl<R> std::fmt::Debug for TableController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableController")
            .field("columns", &self.schema.len())
            .field("active", &self.active.len())
            .field("rows", &self.rows.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<R> TableController<R> {
    /// Build a controller. Fails on schema authoring errors.
    pub fn new(schema: Vec<ColumnSpec<R>>, rows: Vec<R>, config: TableConfig) -> Result<Self, SchemaError> {
        let active = resolve_active_columns(&schema, &rows)?;
        let state = TableState {
            visibility: seed_visibility(&schema),
            page: PageState {
                index: 0,
                size: config.page_size.max(1),
                show_all: config.show_all_rows,
            },
            ..Default::default()
        };
        let debouncer = Debouncer::new(
            Duration::from_millis(config.selection_debounce_ms),
            Rc::new(SystemClock),
        );

        Ok(TableController {
            schema,
            active,
            rows,
            state,
            config,
            selectable: None,
            on_selection: None,
            debouncer,
        })
    }

    /// Replace the clock driving the selection debounce.
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.debouncer.set_clock(clock);
        self
    }

    /// Install a veto on row selection.
    pub fn with_selectable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.selectable = Some(Arc::new(predicate));
        self
    }

    /// Register the debounced selection-changed callback.
    pub fn on_selection_change<F>(&mut self, callback: F)
    where
        F: FnMut(&[&R]) + 'static,
    {
        self.on_selection = Some(Box::new(callback));
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn schema(&self) -> &[ColumnSpec<R>] {
        &self.schema
    }

    pub fn active_columns(&self) -> &[ColumnSpec<R>] {
        &self.active
    }

    /// Active columns the user has not switched off, in schema order.
    pub fn visible_columns(&self) -> Vec<&ColumnSpec<R>> {
        self.active
            .iter()
            .filter(|c| self.is_column_visible(c.id()))
            .collect()
    }

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.state.visibility.get(column_id).copied().unwrap_or(false)
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.state.sort.as_ref()
    }

    fn row_model(&self) -> RowModel<'_, R> {
        RowModel::new(&self.rows, &self.active, &self.config.currency)
    }

    fn active_column(&self, column_id: &str) -> Result<&ColumnSpec<R>, TableError> {
        self.active
            .iter()
            .find(|c| c.id() == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Cycle the sort on `column_id`: ascending, descending, unsorted.
    pub fn set_sort(&mut self, column_id: &str) -> Result<(), TableError> {
        let column = self.active_column(column_id)?;
        if !column.is_sortable() {
            return Err(TableError::NotSortable(column_id.to_string()));
        }

        self.state.sort = match self.state.sort.take() {
            Some(SortState {
                column_id: current,
                direction: SortDirection::Ascending,
            }) if current == column_id => Some(SortState {
                column_id: current,
                direction: SortDirection::Descending,
            }),
            Some(SortState {
                column_id: current,
                direction: SortDirection::Descending,
            }) if current == column_id => None,
            _ => Some(SortState {
                column_id: column_id.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
        debug!("sort is now {:?}", self.state.sort);
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.state.sort = None;
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Case-insensitive substring filter on a column's display text. An empty
    /// value removes the column's filter.
    pub fn set_filter(&mut self, column_id: &str, value: &str) -> Result<(), TableError> {
        let column = self.active_column(column_id)?;
        if !column.is_filterable() {
            return Err(TableError::NotFilterable(column_id.to_string()));
        }

        if value.is_empty() {
            self.state.filters.remove(column_id);
        } else {
            self.state.filters.insert(column_id.to_string(), value.to_string());
        }
        self.clamp_page();
        Ok(())
    }

    /// Search across every visible, filterable column.
    pub fn set_global_search(&mut self, value: &str) {
        self.state.global_search = value.to_string();
        self.clamp_page();
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.global_search.clear();
        self.clamp_page();
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Move to page `index`, clamped to the available pages.
    pub fn set_page(&mut self, index: usize) {
        self.state.page.index = index;
        self.clamp_page();
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), TableError> {
        if size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        self.state.page.size = size;
        self.clamp_page();
        Ok(())
    }

    /// Disable client pagination: one page holding every row.
    pub fn set_show_all_rows(&mut self, show_all: bool) {
        self.state.page.show_all = show_all;
        self.clamp_page();
    }

    /// Rows per page in effect; the dataset length when showing all rows.
    pub fn effective_page_size(&self) -> usize {
        if self.state.page.show_all {
            self.rows.len().max(1)
        } else {
            self.state.page.size.max(1)
        }
    }

    /// Number of pages over the filtered rows; at least one.
    pub fn page_count(&self) -> usize {
        let filtered = self.filtered_count();
        filtered.div_ceil(self.effective_page_size()).max(1)
    }

    /// Current page index, always inside `[0, page_count - 1]`.
    pub fn page_index(&self) -> usize {
        self.state.page.index.min(self.page_count() - 1)
    }

    fn clamp_page(&mut self) {
        let clamped = self.page_index();
        if clamped != self.state.page.index {
            debug!("page index clamped from {} to {}", self.state.page.index, clamped);
            self.state.page.index = clamped;
        }
    }

    // ------------------------------------------------------------------
    // Column visibility
    // ------------------------------------------------------------------

    /// Show or hide a column. Returns whether anything changed; disabled and
    /// hidden columns never change.
    pub fn toggle_column_visibility(&mut self, column_id: &str, visible: bool) -> Result<bool, TableError> {
        let column = self
            .schema
            .iter()
            .find(|c| c.id() == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;

        if column.is_disabled() || column.is_hidden() {
            debug!("visibility toggle on locked column '{}' ignored", column_id);
            return Ok(false);
        }

        let previous = self.state.visibility.insert(column_id.to_string(), visible);
        // Global search only spans visible columns, so the match count can shift
        self.clamp_page();
        Ok(previous != Some(visible))
    }

    // ------------------------------------------------------------------
    // Row selection
    // ------------------------------------------------------------------

    fn is_selectable(&self, index: usize) -> bool {
        match &self.selectable {
            Some(predicate) => predicate(&self.rows[index]),
            None => true,
        }
    }

    /// Select or deselect the row at `index` of the unfiltered dataset.
    pub fn toggle_row_selection(&mut self, index: usize, selected: bool) -> Result<SelectionChange, TableError> {
        if index >= self.rows.len() {
            return Err(TableError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }

        let mut change = SelectionChange::default();
        if selected {
            if self.state.selection.contains(&index) {
                return Ok(change);
            }
            if self.is_selectable(index) {
                change.changed = self.state.selection.insert(index);
            } else {
                change.vetoed.push(index);
            }
        } else {
            change.changed = self.state.selection.remove(&index);
        }

        if change.changed {
            self.debouncer.arm();
        }
        Ok(change)
    }

    /// Select or deselect every row on the current page.
    pub fn toggle_all_on_page(&mut self, selected: bool) -> SelectionChange {
        let mut change = SelectionChange::default();

        for index in self.visible_indices() {
            if selected {
                if self.state.selection.contains(&index) {
                    continue;
                }
                if self.is_selectable(index) {
                    change.changed |= self.state.selection.insert(index);
                } else {
                    change.vetoed.push(index);
                }
            } else {
                change.changed |= self.state.selection.remove(&index);
            }
        }

        if change.changed {
            self.debouncer.arm();
        }
        change
    }

    pub fn clear_selection(&mut self) {
        if !self.state.selection.is_empty() {
            self.state.selection.clear();
            self.debouncer.arm();
        }
    }

    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.state.selection
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.state.selection.contains(&index)
    }

    /// The selected rows themselves, in dataset order.
    pub fn selected_rows(&self) -> Vec<&R> {
        self.state
            .selection
            .iter()
            .filter_map(|&index| self.rows.get(index))
            .collect()
    }

    /// Fire the selection callback if its quiet period has elapsed.
    pub fn poll_notifications(&mut self) -> bool {
        if self.debouncer.take_due() {
            self.notify_selection();
            true
        } else {
            false
        }
    }

    /// Fire a pending selection callback immediately.
    pub fn flush_notifications(&mut self) -> bool {
        if self.debouncer.take_pending() {
            self.notify_selection();
            true
        } else {
            false
        }
    }

    pub fn has_pending_notification(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn notify_selection(&mut self) {
        let Some(mut callback) = self.on_selection.take() else {
            return;
        };
        {
            let selected = self.selected_rows();
            debug!("notifying selection of {} rows", selected.len());
            callback(&selected);
        }
        self.on_selection = Some(callback);
    }

    // ------------------------------------------------------------------
    // Dataset and schema replacement
    // ------------------------------------------------------------------

    /// Install a new dataset. Selection, page and sort reset; filters and
    /// column visibility carry over.
    pub fn replace_rows(&mut self, rows: Vec<R>) -> Result<(), SchemaError> {
        let active = resolve_active_columns(&self.schema, &rows)?;
        info!(
            "table dataset replaced: {} rows, {} active columns",
            rows.len(),
            active.len()
        );

        self.rows = rows;
        self.active = active;
        self.state.sort = None;
        self.state.page.index = 0;
        self.clear_selection();
        Ok(())
    }

    /// Install a new schema. Visibility is reseeded from its defaults.
    pub fn replace_schema(&mut self, schema: Vec<ColumnSpec<R>>) -> Result<(), SchemaError> {
        let active = resolve_active_columns(&schema, &self.rows)?;
        self.state.visibility = seed_visibility(&schema);
        self.state
            .filters
            .retain(|id, _| active.iter().any(|c| c.id() == id.as_str()));
        if let Some(sort) = &self.state.sort {
            if !active.iter().any(|c| c.id() == sort.column_id) {
                self.state.sort = None;
            }
        }
        self.schema = schema;
        self.active = active;
        self.clamp_page();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    fn searchable_ids(&self) -> Vec<&str> {
        self.visible_columns()
            .into_iter()
            .filter(|c| c.is_filterable())
            .map(|c| c.id())
            .collect()
    }

    fn filtered_count(&self) -> usize {
        let searchable = self.searchable_ids();
        self.row_model()
            .matching_indices(&self.state.filters, &self.state.global_search, &searchable)
            .len()
    }

    /// Every row passing the filters, in sort order.
    pub fn filtered_indices(&self) -> Vec<usize> {
        let model = self.row_model();
        let searchable = self.searchable_ids();
        let matching = model.matching_indices(&self.state.filters, &self.state.global_search, &searchable);
        model.sorted(matching, self.state.sort.as_ref())
    }

    /// Rows an export carries: every filtered row in sort order, regardless
    /// of the page window.
    pub fn export_indices(&self) -> Vec<usize> {
        self.filtered_indices()
    }

    /// Indices shown on the current page.
    pub fn visible_indices(&self) -> Vec<usize> {
        let filtered = self.filtered_indices();
        let size = self.effective_page_size();
        let pages = filtered.len().div_ceil(size).max(1);
        let start = self.state.page.index.min(pages - 1) * size;
        filtered.into_iter().skip(start).take(size).collect()
    }

    /// Rows shown on the current page.
    pub fn visible_rows(&self) -> Vec<&R> {
        self.visible_indices()
            .into_iter()
            .map(|index| &self.rows[index])
            .collect()
    }

    pub fn status(&self) -> TableStatus {
        if self.rows.is_empty() {
            TableStatus::Empty
        } else if self.filtered_count() == 0 {
            TableStatus::NoMatches
        } else {
            TableStatus::Rows
        }
    }

    /// Render row `index` (unfiltered position) under `column`.
    pub fn render_cell(
        &self,
        index: usize,
        column: &ColumnSpec<R>,
        target: RenderTarget,
    ) -> Result<RenderedCell, TableError> {
        let row = self.rows.get(index).ok_or(TableError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })?;
        Ok(column.render(row, target, &self.config.currency))
    }

    /// True when some visible column contributes to the totals row.
    pub fn has_totals(&self) -> bool {
        self.visible_columns().iter().any(|c| c.is_summable())
    }

    /// Per visible column: the sum over all filtered rows for summable columns.
    pub fn totals(&self) -> Vec<Option<f64>> {
        let filtered = self.filtered_indices();
        self.visible_columns()
            .into_iter()
            .map(|column| {
                column.is_summable().then(|| {
                    filtered
                        .iter()
                        .filter_map(|&index| column.display(&self.rows[index]).as_f64())
                        .sum()
                })
            })
            .collect()
    }

    /// Distinct display values of an active column, for filter suggestions.
    pub fn distinct_values(&self, column_id: &str) -> Result<Vec<(String, usize)>, TableError> {
        let column = self.active_column(column_id)?;
        Ok(self.row_model().distinct_values(column))
    }

    /// Detail popover entries for a column that bundles other columns.
    pub fn detail(&self, index: usize, column_id: &str) -> Result<Vec<DetailEntry>, TableError> {
        let row = self.rows.get(index).ok_or(TableError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })?;
        let column = self
            .schema
            .iter()
            .find(|c| c.id() == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        Ok(detail_entries(&self.schema, column, row))
    }
}

/// Initial visibility: hidden and deselected columns off, everything else on.
fn seed_visibility<R>(schema: &[ColumnSpec<R>]) -> BTreeMap<String, bool> {
    schema
        .iter()
        .map(|column| {
            let defaults = column.visibility_default();
            let visible = defaults.disabled || (!defaults.hidden && !defaults.deselected);
            (column.id().to_string(), visible)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ManualClock;
    use crate::value::{RawValue, Record};
    use rstest::*;
    use std::cell::RefCell;

    fn schema() -> Vec<ColumnSpec<Record>> {
        vec![
            ColumnSpec::field("SCRIP", "Scrip").disabled(),
            ColumnSpec::field("QTY", "Quantity").summable(),
            ColumnSpec::field("AMOUNT", "Amount").currency().summable(),
            ColumnSpec::field("STATUS", "Status").deselected(),
            ColumnSpec::field("ISIN", "ISIN").hidden(),
        ]
    }

    #[fixture]
    fn holdings() -> Vec<Record> {
        vec![
            Record::new().with("SCRIP", "INFY").with("QTY", 10).with("AMOUNT", 15000.0).with("STATUS", "OPEN"),
            Record::new().with("SCRIP", "TCS").with("QTY", 5).with("AMOUNT", 17500.5).with("STATUS", "CLOSED"),
            Record::new().with("SCRIP", "HDFCBANK").with("QTY", "3").with("AMOUNT", -450.0).with("STATUS", "OPEN"),
            Record::new().with("SCRIP", "WIPRO").with("QTY", RawValue::Null).with("AMOUNT", 300.0).with("STATUS", "OPEN"),
        ]
    }

    fn controller(rows: Vec<Record>) -> TableController<Record> {
        TableController::new(schema(), rows, TableConfig::default()).unwrap()
    }

    fn scrips(ctl: &TableController<Record>) -> Vec<String> {
        ctl.visible_rows().iter().map(|r| r.get("SCRIP").to_string()).collect()
    }

    #[rstest]
    fn test_visibility_seeded_from_defaults(holdings: Vec<Record>) {
        let ctl = controller(holdings);
        let ids: Vec<&str> = ctl.visible_columns().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["SCRIP", "QTY", "AMOUNT"]);
        assert!(!ctl.is_column_visible("STATUS"));
        assert!(!ctl.is_column_visible("ISIN"));
        assert_eq!(ctl.active_columns().len(), 4);
    }

    #[rstest]
    fn test_disabled_and_hidden_columns_cannot_toggle(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        assert_eq!(ctl.toggle_column_visibility("SCRIP", false), Ok(false));
        assert!(ctl.is_column_visible("SCRIP"));
        assert_eq!(ctl.toggle_column_visibility("ISIN", true), Ok(false));
        assert!(!ctl.is_column_visible("ISIN"));

        assert_eq!(ctl.toggle_column_visibility("STATUS", true), Ok(true));
        assert_eq!(ctl.toggle_column_visibility("STATUS", true), Ok(false));
        assert!(ctl.is_column_visible("STATUS"));

        assert_eq!(
            ctl.toggle_column_visibility("NOPE", true),
            Err(TableError::UnknownColumn("NOPE".to_string()))
        );
    }

    #[rstest]
    fn test_sort_cycles_back_to_insertion_order(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        let original = scrips(&ctl);

        ctl.set_sort("AMOUNT").unwrap();
        assert_eq!(scrips(&ctl), vec!["HDFCBANK", "WIPRO", "INFY", "TCS"]);
        ctl.set_sort("AMOUNT").unwrap();
        assert_eq!(scrips(&ctl), vec!["TCS", "INFY", "WIPRO", "HDFCBANK"]);
        ctl.set_sort("AMOUNT").unwrap();
        assert_eq!(ctl.sort(), None);
        assert_eq!(scrips(&ctl), original);
    }

    #[rstest]
    fn test_sorting_another_column_starts_ascending(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.set_sort("AMOUNT").unwrap();
        ctl.set_sort("AMOUNT").unwrap();
        ctl.set_sort("SCRIP").unwrap();
        assert_eq!(
            ctl.sort(),
            Some(&SortState {
                column_id: "SCRIP".to_string(),
                direction: SortDirection::Ascending,
            })
        );
        assert!(ctl.set_sort("ISIN").is_err());
    }

    #[rstest]
    fn test_empty_filter_restores_rows(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        let before = ctl.filtered_indices().len();

        ctl.set_filter("STATUS", "open").unwrap();
        assert_eq!(ctl.filtered_indices(), vec![0, 2, 3]);

        ctl.set_filter("STATUS", "").unwrap();
        assert_eq!(ctl.filtered_indices().len(), before);
        assert!(ctl.state().filters.is_empty());
    }

    #[rstest]
    fn test_global_search_ignores_invisible_columns(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        // STATUS starts deselected
        ctl.set_global_search("closed");
        assert_eq!(ctl.status(), TableStatus::NoMatches);

        ctl.toggle_column_visibility("STATUS", true).unwrap();
        assert_eq!(ctl.filtered_indices(), vec![1]);
    }

    #[rstest]
    fn test_page_clamped_when_hiding_searched_column(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.toggle_column_visibility("STATUS", true).unwrap();
        ctl.set_global_search("o");
        ctl.set_page_size(2).unwrap();
        ctl.set_page(1);
        assert_eq!(ctl.state().page.index, 1);

        // Only WIPRO still matches once STATUS is out of the search
        ctl.toggle_column_visibility("STATUS", false).unwrap();
        assert_eq!(ctl.filtered_indices(), vec![3]);
        assert_eq!(ctl.state().page.index, 0);
        assert_eq!(scrips(&ctl), vec!["WIPRO"]);
    }

    #[rstest]
    fn test_render_cell_out_of_range_is_an_error(holdings: Vec<Record>) {
        let ctl = controller(holdings);
        let amount = ctl.visible_columns()[2].clone();
        assert_eq!(
            ctl.render_cell(0, &amount, RenderTarget::Export).unwrap().text,
            "₹15,000.00"
        );
        assert_eq!(
            ctl.render_cell(4, &amount, RenderTarget::Export),
            Err(TableError::RowOutOfRange { index: 4, len: 4 })
        );
    }

    #[rstest]
    fn test_page_clamped_when_filter_shrinks(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.set_page_size(2).unwrap();
        ctl.set_page(1);
        assert_eq!(ctl.page_count(), 2);
        assert_eq!(scrips(&ctl), vec!["HDFCBANK", "WIPRO"]);

        ctl.set_filter("SCRIP", "tcs").unwrap();
        assert_eq!(ctl.state().page.index, 0);
        assert_eq!(scrips(&ctl), vec!["TCS"]);

        ctl.set_page(99);
        assert_eq!(ctl.page_index(), 0);
        assert_eq!(ctl.set_page_size(0), Err(TableError::InvalidPageSize));
    }

    #[test]
    fn test_show_all_rows_disables_paging() {
        let rows: Vec<Record> = (0..1000)
            .map(|i| Record::new().with("SCRIP", format!("S{i}")).with("QTY", i))
            .collect();
        let mut ctl = controller(rows);
        assert_eq!(ctl.visible_rows().len(), 10);

        ctl.set_show_all_rows(true);
        assert_eq!(ctl.visible_rows().len(), 1000);
        assert_eq!(ctl.page_count(), 1);
        assert_eq!(ctl.filtered_indices().len(), 1000);
    }

    #[rstest]
    fn test_selection_cleared_on_dataset_replacement(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.toggle_row_selection(0, true).unwrap();
        ctl.toggle_row_selection(2, true).unwrap();
        assert_eq!(ctl.selection().len(), 2);

        let refetched: Vec<Record> = (0..1000).map(|i| Record::new().with("SCRIP", format!("S{i}"))).collect();
        ctl.replace_rows(refetched).unwrap();
        assert!(ctl.selection().is_empty());
        assert_eq!(ctl.rows().len(), 1000);
    }

    #[rstest]
    fn test_refetch_resets_sort_and_page_but_keeps_visibility(holdings: Vec<Record>) {
        let mut ctl = controller(holdings.clone());
        ctl.toggle_column_visibility("STATUS", true).unwrap();
        ctl.toggle_column_visibility("QTY", false).unwrap();
        ctl.set_sort("SCRIP").unwrap();
        ctl.set_page_size(2).unwrap();
        ctl.set_page(1);

        ctl.replace_rows(holdings).unwrap();
        assert_eq!(ctl.sort(), None);
        assert_eq!(ctl.page_index(), 0);
        assert!(ctl.is_column_visible("STATUS"));
        assert!(!ctl.is_column_visible("QTY"));
    }

    #[rstest]
    fn test_selectable_predicate_vetoes(holdings: Vec<Record>) {
        let mut ctl = controller(holdings)
            .with_selectable(|r: &Record| r.get("STATUS").as_str() != Some("CLOSED"));

        let change = ctl.toggle_row_selection(1, true).unwrap();
        assert_eq!(change, SelectionChange { changed: false, vetoed: vec![1] });

        let change = ctl.toggle_all_on_page(true);
        assert!(change.changed);
        assert_eq!(change.vetoed, vec![1]);
        assert_eq!(ctl.selection().iter().copied().collect::<Vec<_>>(), vec![0, 2, 3]);

        let change = ctl.toggle_all_on_page(false);
        assert!(change.changed);
        assert!(ctl.selection().is_empty());

        assert!(matches!(
            ctl.toggle_row_selection(10, true),
            Err(TableError::RowOutOfRange { index: 10, len: 4 })
        ));
    }

    #[rstest]
    fn test_selection_notification_is_debounced(holdings: Vec<Record>) {
        let clock = Rc::new(ManualClock::new());
        let mut ctl = controller(holdings).with_clock(clock.clone());
        let received: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        ctl.on_selection_change(move |rows: &[&Record]| {
            sink.borrow_mut().push(rows.iter().map(|r| r.get("SCRIP").to_string()).collect());
        });

        ctl.toggle_row_selection(0, true).unwrap();
        clock.advance(Duration::from_millis(100));
        ctl.toggle_row_selection(2, true).unwrap();
        clock.advance(Duration::from_millis(150));
        assert!(!ctl.poll_notifications());
        assert!(received.borrow().is_empty());

        clock.advance(Duration::from_millis(50));
        assert!(ctl.poll_notifications());
        assert_eq!(*received.borrow(), vec![vec!["INFY".to_string(), "HDFCBANK".to_string()]]);

        // No change, no notification
        ctl.toggle_row_selection(0, true).unwrap();
        clock.advance(Duration::from_millis(500));
        assert!(!ctl.poll_notifications());
    }

    #[rstest]
    fn test_flush_fires_pending_notification(holdings: Vec<Record>) {
        let clock = Rc::new(ManualClock::new());
        let mut ctl = controller(holdings).with_clock(clock);
        let count = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&count);
        ctl.on_selection_change(move |_rows: &[&Record]| *sink.borrow_mut() += 1);

        ctl.toggle_row_selection(1, true).unwrap();
        assert!(ctl.has_pending_notification());
        assert!(ctl.flush_notifications());
        assert!(!ctl.flush_notifications());
        assert_eq!(*count.borrow(), 1);
    }

    #[rstest]
    fn test_totals_cover_all_filtered_rows(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.set_page_size(1).unwrap();
        assert!(ctl.has_totals());
        assert_eq!(ctl.totals(), vec![None, Some(18.0), Some(32350.5)]);

        ctl.set_filter("STATUS", "OPEN").unwrap();
        assert_eq!(ctl.totals(), vec![None, Some(13.0), Some(14850.0)]);
    }

    #[rstest]
    fn test_status_distinguishes_empty_and_no_matches(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        assert_eq!(ctl.status(), TableStatus::Rows);
        ctl.set_filter("SCRIP", "zzz").unwrap();
        assert_eq!(ctl.status(), TableStatus::NoMatches);
        ctl.replace_rows(Vec::new()).unwrap();
        assert_eq!(ctl.status(), TableStatus::Empty);
    }

    #[test]
    fn test_duplicate_schema_fails_fast() {
        let schema = vec![ColumnSpec::<Record>::field("A", "A"), ColumnSpec::field("A", "B")];
        let result = TableController::new(schema, Vec::new(), TableConfig::default());
        assert!(matches!(result, Err(SchemaError::DuplicateId(_))));
    }

    #[rstest]
    fn test_replace_schema_reseeds_visibility(holdings: Vec<Record>) {
        let mut ctl = controller(holdings);
        ctl.toggle_column_visibility("QTY", false).unwrap();
        ctl.set_filter("STATUS", "open").unwrap();

        ctl.replace_schema(vec![ColumnSpec::field("SCRIP", "Scrip"), ColumnSpec::field("QTY", "Quantity")])
            .unwrap();
        assert!(ctl.is_column_visible("QTY"));
        assert!(ctl.state().filters.is_empty());
    }
}
