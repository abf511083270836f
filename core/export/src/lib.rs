//! FILENAME: core/export/src/lib.rs
//! Tabula Export Module
//!
//! Turns the current state of a table controller into CSV, XLSX and PDF
//! artifacts, each prefixed with the letterhead block.

mod artifact;
mod config;
mod csv_writer;
mod document;
mod error;
mod filename;
mod letterhead;
mod pdf_writer;
mod table;
mod xlsx_writer;

pub use artifact::ExportArtifact;
pub use config::{DocumentConfig, ExportConfig};
pub use csv_writer::{quote_cell, write_csv, UTF8_BOM};
pub use document::{layout_document, DocumentLayout, DocumentPage, LaidOutCell, LaidOutRow, RowKind, TextRun};
pub use error::ExportError;
pub use filename::{local_filename, timestamped_filename, ExportFormat, DEFAULT_STEM};
pub use letterhead::{ExpenseLine, Expenses, Letterhead};
pub use pdf_writer::{encode_text, write_pdf};
pub use table::{ExpenseBlock, ExpenseRow, ExportCell, ExportColumn, ExportTable};
pub use xlsx_writer::{write_xlsx, SHEET_NAME};

use log::debug;
use tabula_engine::TableController;

/// Render a captured snapshot in `format`.
pub fn render(format: ExportFormat, table: &ExportTable, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(table),
        ExportFormat::Spreadsheet => write_xlsx(table),
        ExportFormat::Document => {
            let layout = layout_document(table, &config.document)?;
            write_pdf(&layout, &table.title, config.document.fallback_char)
        }
    }
}

/// Capture `controller`'s current state and produce a named artifact.
pub fn export<R>(
    format: ExportFormat,
    controller: &TableController<R>,
    config: &ExportConfig,
    expenses: Option<&Expenses>,
    stem: Option<&str>,
) -> Result<ExportArtifact, ExportError> {
    let snapshot = ExportTable::capture(controller, config, expenses)?;
    let bytes = render(format, &snapshot, config)?;
    let filename = local_filename(stem.unwrap_or(DEFAULT_STEM), format);
    debug!("{:?} export '{}': {} bytes", format, filename, bytes.len());
    Ok(ExportArtifact::new(format, filename, bytes))
}
