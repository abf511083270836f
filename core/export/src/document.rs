//! FILENAME: core/export/src/document.rs
//! PURPOSE: Page layout for the paginated document export.
//! CONTEXT: Layout works on the original cell text; encoding into the PDF byte
//! stream (and the fallback substitution that goes with it) happens in
//! `pdf_writer`. Coordinates are in points measured from the top-left corner.

use log::debug;

use crate::config::DocumentConfig;
use crate::error::ExportError;
use crate::table::{ExportCell, ExportTable};

/// Average Helvetica glyph advance as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f64 = 0.5;

/// Horizontal padding inside each table cell.
const CELL_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    ExpenseTitle,
    Expense,
    ExpenseTotal,
    Header,
    Body,
    Totals,
}

impl RowKind {
    pub fn is_bold(self) -> bool {
        matches!(
            self,
            RowKind::ExpenseTitle | RowKind::ExpenseTotal | RowKind::Header | RowKind::Totals
        )
    }
}

/// Free-standing text (title, identity line, page footer).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    /// Baseline, from the top edge.
    pub y: f64,
    pub size: f64,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutCell {
    pub x: f64,
    pub width: f64,
    pub text: String,
    pub align_right: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutRow {
    pub kind: RowKind,
    /// Top of the row band, from the top edge.
    pub top: f64,
    pub height: f64,
    pub cells: Vec<LaidOutCell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPage {
    pub texts: Vec<TextRun>,
    pub rows: Vec<LaidOutRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub width: f64,
    pub height: f64,
    pub body_font_size: f64,
    pub pages: Vec<DocumentPage>,
}

impl DocumentLayout {
    /// Rows of the given kind across every page, as cell texts.
    pub fn row_texts(&self, kind: RowKind) -> Vec<Vec<&str>> {
        self.pages
            .iter()
            .flat_map(|page| page.rows.iter())
            .filter(|row| row.kind == kind)
            .map(|row| row.cells.iter().map(|cell| cell.text.as_str()).collect())
            .collect()
    }
}

/// One row waiting to be placed.
struct PendingRow {
    kind: RowKind,
    texts: Vec<(String, bool)>,
}

/// Lay `table` out on pages sized by `config`.
pub fn layout_document(table: &ExportTable, config: &DocumentConfig) -> Result<DocumentLayout, ExportError> {
    config.validate()?;
    if table.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let usable_width = config.page_width - 2.0 * config.margin;
    let table_columns = column_bands(table, config.margin, usable_width);
    let expense_columns = vec![
        (config.margin, usable_width * 0.6),
        (config.margin + usable_width * 0.6, usable_width * 0.4),
    ];

    let header = PendingRow {
        kind: RowKind::Header,
        texts: table.columns.iter().map(|c| (c.header.clone(), false)).collect(),
    };

    let mut pages = vec![DocumentPage::default()];
    let title_baseline = config.margin + config.title_font_size;
    pages[0].texts.push(TextRun {
        x: config.margin,
        y: title_baseline,
        size: config.title_font_size,
        bold: true,
        text: table.title.clone(),
    });
    pages[0].texts.push(TextRun {
        x: config.margin,
        y: title_baseline + config.title_font_size * 1.4,
        size: config.body_font_size + 2.0,
        bold: false,
        text: table.identity.clone(),
    });

    let bottom = config.page_height - config.margin;
    let mut y = config.table_top;
    let mut in_table = false;

    let place = |pages: &mut Vec<DocumentPage>, y: &mut f64, row: &PendingRow, bands: &[(f64, f64)]| {
        let cells = row
            .texts
            .iter()
            .zip(bands)
            .map(|((text, align_right), (x, width))| LaidOutCell {
                x: *x,
                width: *width,
                text: text.clone(),
                align_right: *align_right,
            })
            .collect();
        if let Some(page) = pages.last_mut() {
            page.rows.push(LaidOutRow {
                kind: row.kind,
                top: *y,
                height: config.row_height,
                cells,
            });
        }
        *y += config.row_height;
    };

    if let Some(expenses) = &table.expenses {
        let mut stream = vec![PendingRow {
            kind: RowKind::ExpenseTitle,
            texts: vec![(expenses.title.clone(), false)],
        }];
        stream.extend(expenses.lines.iter().map(|line| PendingRow {
            kind: RowKind::Expense,
            texts: vec![(line.label.clone(), false), (line.text.clone(), true)],
        }));
        stream.push(PendingRow {
            kind: RowKind::ExpenseTotal,
            texts: vec![(expenses.total.label.clone(), false), (expenses.total.text.clone(), true)],
        });

        for row in &stream {
            if y + config.row_height > bottom {
                pages.push(DocumentPage::default());
                y = config.margin;
            }
            place(&mut pages, &mut y, row, &expense_columns);
        }
        y += config.row_height;
    }

    let body = table
        .rows
        .iter()
        .map(|cells| pending(RowKind::Body, cells))
        .chain(table.totals.iter().map(|cells| pending(RowKind::Totals, cells)));

    for row in body {
        // A page must fit the repeated header plus at least one row
        let needed = (if in_table { 1.0 } else { 2.0 }) * config.row_height;
        if y + needed > bottom {
            pages.push(DocumentPage::default());
            y = config.margin;
            in_table = false;
        }
        if !in_table {
            if y + 2.0 * config.row_height > bottom {
                return Err(ExportError::Layout("page too short for a table row".to_string()));
            }
            place(&mut pages, &mut y, &header, &table_columns);
            in_table = true;
        }
        place(&mut pages, &mut y, &row, &table_columns);
    }

    // Header only, for an empty result
    if !in_table {
        if y + config.row_height > bottom {
            pages.push(DocumentPage::default());
            y = config.margin;
        }
        place(&mut pages, &mut y, &header, &table_columns);
    }

    let page_count = pages.len();
    for (number, page) in pages.iter_mut().enumerate() {
        page.texts.push(TextRun {
            x: config.margin,
            y: config.page_height - config.margin / 2.0,
            size: config.body_font_size,
            bold: false,
            text: format!("Page {} of {}", number + 1, page_count),
        });
    }

    debug!(
        "document layout: {} rows on {} pages",
        table.rows.len(),
        page_count
    );

    Ok(DocumentLayout {
        width: config.page_width,
        height: config.page_height,
        body_font_size: config.body_font_size,
        pages,
    })
}

fn pending(kind: RowKind, cells: &[ExportCell]) -> PendingRow {
    PendingRow {
        kind,
        texts: cells
            .iter()
            .map(|cell| (cell.text.clone(), cell.number.is_some()))
            .collect(),
    }
}

/// Split the usable width between columns in proportion to their widths.
fn column_bands(table: &ExportTable, left: f64, usable_width: f64) -> Vec<(f64, f64)> {
    let widths: Vec<f64> = (0..table.column_count()).map(|i| table.column_width(i)).collect();
    let total: f64 = widths.iter().sum();
    let mut x = left;
    widths
        .iter()
        .map(|w| {
            let width = usable_width * w / total;
            let band = (x, width);
            x += width;
            band
        })
        .collect()
}

/// Estimated rendered width of `text`, for right alignment.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * AVERAGE_GLYPH_WIDTH
}

/// Baseline x of `cell`'s text.
pub fn text_origin(cell: &LaidOutCell, size: f64) -> f64 {
    if cell.align_right {
        (cell.x + cell.width - CELL_PADDING - text_width(&cell.text, size)).max(cell.x + CELL_PADDING)
    } else {
        cell.x + CELL_PADDING
    }
}
