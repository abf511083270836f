//! FILENAME: core/tabula/src/lib.rs
//! Tabula
//!
//! Schema-driven data tables: declare columns once, load rows from any source,
//! let users sort, filter, page and select, and export exactly what they see
//! to CSV, XLSX or PDF.

mod engine;
mod notice;
mod source;

pub use engine::{EngineStatus, RefreshOutcome, TabularDataEngine};
pub use notice::{LogNotifier, Notice, NoticeQueue, Notifier};
pub use source::{status_authorized, Envelope};

pub use tabula_engine::{
    BadgeTone, CellRenderer, Clock, ColumnSpec, CurrencyConfig, DetailEntry, DisplayValue, Grouping, ManualClock,
    RawValue, Record, RenderTarget, RenderedCell, SchemaError, SelectionChange, SortDirection, SortState,
    SystemClock, TableConfig, TableController, TableError, TableStatus, VisibilityDefault,
};
pub use tabula_export::{
    DocumentConfig, ExpenseLine, Expenses, ExportArtifact, ExportConfig, ExportError, ExportFormat, Letterhead,
};
