//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the tabular data engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod column;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod format;
pub mod notify;
pub mod row_model;
pub mod schema;
pub mod value;

// Re-export commonly used types at the crate root
pub use column::{BadgeTone, CellRenderer, ColumnSpec, RenderTarget, RenderedCell, VisibilityDefault};
pub use config::{CurrencyConfig, Grouping, TableConfig};
pub use controller::{PageState, SelectionChange, TableController, TableState, TableStatus};
pub use detail::{detail_entries, DetailEntry};
pub use error::{ConfigError, SchemaError, TableError};
pub use format::{format_currency, format_decimal, format_general, format_percent, format_value, PLACEHOLDER};
pub use notify::{Clock, Debouncer, ManualClock, SystemClock};
pub use row_model::{RowModel, SortDirection, SortKey, SortState};
pub use schema::{resolve_active_columns, validate_schema};
pub use value::{DisplayValue, RawValue, Record};
