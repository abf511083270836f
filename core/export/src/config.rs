//! FILENAME: core/export/src/config.rs
//! PURPOSE: Export settings: letterhead identity, labels and document page layout.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::letterhead::Letterhead;

/// Page geometry and type sizes for the paginated document, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Distance from the top edge of page one to the table header row.
    pub table_top: f64,
    pub title_font_size: f64,
    pub body_font_size: f64,
    pub row_height: f64,
    /// Replaces characters the document's base fonts cannot encode.
    pub fallback_char: char,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        // A4 landscape
        DocumentConfig {
            page_width: 842.0,
            page_height: 595.0,
            margin: 40.0,
            table_top: 90.0,
            title_font_size: 14.0,
            body_font_size: 8.0,
            row_height: 14.0,
            fallback_char: '?',
        }
    }
}

impl DocumentConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.page_width <= 2.0 * self.margin || self.page_height <= 2.0 * self.margin {
            return Err(ExportError::Config("margins leave no printable area".to_string()));
        }
        if self.row_height <= 0.0 || self.body_font_size <= 0.0 || self.title_font_size <= 0.0 {
            return Err(ExportError::Config("font sizes and row height must be positive".to_string()));
        }
        if self.table_top + 2.0 * self.row_height > self.page_height - self.margin {
            return Err(ExportError::Config("table offset leaves no room for rows".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub letterhead: Letterhead,
    /// Heading of the expenses preamble.
    pub expenses_title: String,
    /// Label placed in the first cell of the totals row.
    pub totals_label: String,
    pub document: DocumentConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            letterhead: Letterhead::default(),
            expenses_title: "Expenses".to_string(),
            totals_label: "Total".to_string(),
            document: DocumentConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        let config: ExportConfig = serde_json::from_str(json)?;
        config.document.validate()?;
        Ok(config)
    }

    pub fn with_letterhead(mut self, letterhead: Letterhead) -> Self {
        self.letterhead = letterhead;
        self
    }
}
