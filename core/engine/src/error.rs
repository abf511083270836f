//! FILENAME: core/engine/src/error.rs

use thiserror::Error;

/// Column schema authoring mistakes, reported when the schema is resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column id must not be empty (header '{header}')")]
    EmptyId { header: String },

    #[error("duplicate column id '{0}'")]
    DuplicateId(String),

    #[error("column '{0}' is both disabled and hidden")]
    DisabledAndHidden(String),

    #[error("column '{0}' is both disabled and deselected")]
    DisabledAndDeselected(String),

    #[error("column '{column}' bundles unknown column '{reference}'")]
    UnknownDetailRef { column: String, reference: String },

    #[error("column '{0}' bundles itself as a detail field")]
    SelfDetailRef(String),
}

/// Errors returned by table controller operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not sortable")]
    NotSortable(String),

    #[error("column '{0}' is not filterable")]
    NotFilterable(String),

    #[error("row {index} is out of range (dataset has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
