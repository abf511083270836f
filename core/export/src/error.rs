//! FILENAME: core/export/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Table error: {0}")]
    Table(#[from] tabula_engine::TableError),

    #[error("Nothing to export: no visible columns")]
    NoColumns,

    #[error("Document layout error: {0}")]
    Layout(String),

    #[error("Invalid export configuration: {0}")]
    Config(String),

    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
