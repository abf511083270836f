//! FILENAME: core/tabula/src/engine.rs
//! PURPOSE: `TabularDataEngine`, the host-facing table: row loading, status,
//! selection notices and the three export invocations.
//! CONTEXT: Wraps one `TableController`. All interactive state lives in the
//! controller; this layer adds load state, authorization and notices.

use std::future::Future;
use std::rc::Rc;

use log::{error, info, warn};
use serde::Serialize;
use tabula_engine::{
    Clock, ColumnSpec, SchemaError, SelectionChange, TableConfig, TableController, TableError, TableStatus,
};
use tabula_export::{export, ExportArtifact, ExportConfig, ExportError, ExportFormat, Expenses};

use crate::notice::{LogNotifier, Notice, Notifier};
use crate::source::Envelope;

/// What the rendering surface should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum EngineStatus {
    /// No fetch has completed yet.
    NotLoaded,
    /// The last fetch failed.
    LoadFailed(String),
    Empty,
    NoMatches,
    Rows,
}

/// Result of one `refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefreshOutcome {
    Loaded { rows: usize },
    Failed { message: String },
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded,
    Failed(String),
}

pub struct TabularDataEngine<R> {
    table: TableController<R>,
    export_config: ExportConfig,
    expenses: Option<Expenses>,
    load_state: LoadState,
    notifier: Box<dyn Notifier>,
}

impl<R> std::fmt::Debug for TabularDataEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularDataEngine")
            .field("table", &self.table)
            .field("load_state", &self.load_state)
            .field("expenses", &self.expenses.is_some())
            .finish_non_exhaustive()
    }
}

impl<R> TabularDataEngine<R> {
    /// An engine with no rows yet. Fails on schema authoring errors.
    pub fn new(
        schema: Vec<ColumnSpec<R>>,
        config: TableConfig,
        export_config: ExportConfig,
    ) -> Result<Self, SchemaError> {
        Ok(TabularDataEngine {
            table: TableController::new(schema, Vec::new(), config)?,
            export_config,
            expenses: None,
            load_state: LoadState::NotLoaded,
            notifier: Box::new(LogNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_selectable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.table = self.table.with_selectable(predicate);
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.table = self.table.with_clock(clock);
        self
    }

    pub fn table(&self) -> &TableController<R> {
        &self.table
    }

    /// Direct access for sorting, filtering, paging and visibility.
    pub fn table_mut(&mut self) -> &mut TableController<R> {
        &mut self.table
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.export_config
    }

    /// Expenses preamble included in subsequent exports.
    pub fn set_expenses(&mut self, expenses: Option<Expenses>) {
        self.expenses = expenses;
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Await `fetch` and install its rows.
    ///
    /// `authorized` is checked once against the response. An unauthorized
    /// response leaves the engine untouched. An error response marks the load
    /// as failed and keeps the previous rows.
    pub async fn refresh<F, A>(&mut self, fetch: F, authorized: A) -> Result<RefreshOutcome, SchemaError>
    where
        F: Future<Output = Envelope<R>>,
        A: Fn(&Envelope<R>) -> bool,
    {
        let envelope = fetch.await;

        if !authorized(&envelope) {
            warn!("row fetch rejected as unauthorized (status {:?})", envelope.status());
            self.notifier.notify(Notice::Unauthorized);
            return Ok(RefreshOutcome::Unauthorized);
        }

        match envelope {
            Envelope::Rows(rows) => {
                let count = rows.len();
                self.table.replace_rows(rows)?;
                self.load_state = LoadState::Loaded;
                info!("refresh loaded {} rows", count);
                Ok(RefreshOutcome::Loaded { rows: count })
            }
            Envelope::Error { message, status } => {
                warn!("row fetch failed (status {:?}): {}", status, message);
                self.load_state = LoadState::Failed(message.clone());
                self.notifier.notify(Notice::LoadFailed {
                    message: message.clone(),
                });
                Ok(RefreshOutcome::Failed { message })
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        match &self.load_state {
            LoadState::NotLoaded => EngineStatus::NotLoaded,
            LoadState::Failed(message) => EngineStatus::LoadFailed(message.clone()),
            LoadState::Loaded => match self.table.status() {
                TableStatus::Rows => EngineStatus::Rows,
                TableStatus::NoMatches => EngineStatus::NoMatches,
                TableStatus::Empty => EngineStatus::Empty,
            },
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn toggle_row_selection(&mut self, index: usize, selected: bool) -> Result<SelectionChange, TableError> {
        let change = self.table.toggle_row_selection(index, selected)?;
        self.report_vetoes(&change);
        Ok(change)
    }

    /// Bulk selection; any vetoes are reported as one grouped notice.
    pub fn toggle_all_on_page(&mut self, selected: bool) -> SelectionChange {
        let change = self.table.toggle_all_on_page(selected);
        self.report_vetoes(&change);
        change
    }

    fn report_vetoes(&self, change: &SelectionChange) {
        if !change.vetoed.is_empty() {
            warn!("{} rows refused selection", change.vetoed.len());
            self.notifier.notify(Notice::SelectionVetoed {
                count: change.vetoed.len(),
            });
        }
    }

    /// Drive the debounced selection callback from the host loop.
    pub fn poll_notifications(&mut self) -> bool {
        self.table.poll_notifications()
    }

    pub fn flush_notifications(&mut self) -> bool {
        self.table.flush_notifications()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    pub fn export_csv(&self, stem: Option<&str>) -> Result<ExportArtifact, ExportError> {
        self.run_export(ExportFormat::Csv, stem)
    }

    pub fn export_spreadsheet(&self, stem: Option<&str>) -> Result<ExportArtifact, ExportError> {
        self.run_export(ExportFormat::Spreadsheet, stem)
    }

    pub fn export_document(&self, stem: Option<&str>) -> Result<ExportArtifact, ExportError> {
        self.run_export(ExportFormat::Document, stem)
    }

    fn run_export(&self, format: ExportFormat, stem: Option<&str>) -> Result<ExportArtifact, ExportError> {
        export(format, &self.table, &self.export_config, self.expenses.as_ref(), stem).map_err(|e| {
            error!("{:?} export failed: {}", format, e);
            self.notifier.notify(Notice::ExportFailed {
                format,
                message: e.to_string(),
            });
            e
        })
    }
}
