//! FILENAME: core/export/src/filename.rs
//! PURPOSE: Timestamped artifact filenames.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Artifact formats and their file conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
    Document,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Document => "application/pdf",
        }
    }
}

pub const DEFAULT_STEM: &str = "export";

/// `{stem}_{YYYYMMDD_HHMMSS}.{ext}` for the given instant.
pub fn timestamped_filename<Tz: TimeZone>(stem: &str, format: ExportFormat, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stem = sanitize_stem(stem);
    format!("{}_{}.{}", stem, at.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Filename stamped with the current local time.
pub fn local_filename(stem: &str, format: ExportFormat) -> String {
    timestamped_filename(stem, format, &Local::now())
}

/// Strip path separators and other characters that are unsafe in filenames.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        cleaned
    }
}
