//! FILENAME: core/export/src/table.rs
//! PURPOSE: Format-neutral snapshot of a table, captured once per export.
//! CONTEXT: CSV, spreadsheet and document writers all consume the same
//! `ExportTable`, so header labels, column order, row order and cell text are
//! identical across formats by construction.

use log::debug;
use tabula_engine::{
    format_currency, format_general, ColumnSpec, CurrencyConfig, RenderTarget, TableController, TableError,
};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::letterhead::Expenses;

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCell {
    pub text: String,
    /// Set when the text is the plain general-format rendering of a number,
    /// so the spreadsheet can store a real number without changing the text.
    pub number: Option<f64>,
}

impl ExportCell {
    pub fn text(text: impl Into<String>) -> Self {
        ExportCell {
            text: text.into(),
            number: None,
        }
    }

    fn from_rendered(text: String, numeric: Option<f64>) -> Self {
        let number = numeric.filter(|n| format_general(*n) == text);
        ExportCell { text, number }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportColumn {
    pub id: String,
    pub header: String,
    /// Width hint in characters.
    pub width: Option<f64>,
}

/// A rendered expense line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub label: String,
    pub amount: f64,
    pub text: String,
}

/// The expenses preamble, rendered with the table's currency settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBlock {
    pub title: String,
    pub lines: Vec<ExpenseRow>,
    pub total: ExpenseRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub title: String,
    pub identity: String,
    /// The table's currency. CSV quotes any cell containing its glyph and the
    /// spreadsheet derives its amount format from it.
    pub currency: CurrencyConfig,
    pub expenses: Option<ExpenseBlock>,
    pub columns: Vec<ExportColumn>,
    pub rows: Vec<Vec<ExportCell>>,
    pub totals: Option<Vec<ExportCell>>,
}

impl ExportTable {
    /// Snapshot the controller's current state: visible columns in order,
    /// every filtered row in sort order (not just the current page), rendered
    /// for export.
    pub fn capture<R>(
        table: &TableController<R>,
        config: &ExportConfig,
        expenses: Option<&Expenses>,
    ) -> Result<Self, ExportError> {
        let columns: Vec<&ColumnSpec<R>> = table.visible_columns();
        if columns.is_empty() {
            return Err(ExportError::NoColumns);
        }

        let rows: Vec<Vec<ExportCell>> = table
            .export_indices()
            .into_iter()
            .map(|index| {
                columns
                    .iter()
                    .map(|column| {
                        let cell = table.render_cell(index, column, RenderTarget::Export)?;
                        Ok(ExportCell::from_rendered(cell.text, cell.numeric))
                    })
                    .collect::<Result<Vec<_>, TableError>>()
            })
            .collect::<Result<_, _>>()?;

        let currency = &table.config().currency;
        let totals = table.has_totals().then(|| {
            let sums = table.totals();
            // Label goes in the first column without a sum; none when every column has one
            let label_at = sums.iter().position(Option::is_none);
            columns
                .iter()
                .zip(sums)
                .enumerate()
                .map(|(position, (column, total))| match total {
                    Some(total) => ExportCell::from_rendered(column.render_total(total, currency), Some(total)),
                    None if Some(position) == label_at => ExportCell::text(config.totals_label.clone()),
                    None => ExportCell::text(""),
                })
                .collect()
        });

        let expenses = expenses.filter(|e| !e.is_empty()).map(|e| {
            let render = |label: &str, amount: f64| ExpenseRow {
                label: label.to_string(),
                amount,
                text: format_currency(amount, currency.decimal_places, currency),
            };
            ExpenseBlock {
                title: config.expenses_title.clone(),
                lines: e.lines.iter().map(|line| render(&line.label, line.amount)).collect(),
                total: render(&config.totals_label, e.total),
            }
        });

        debug!(
            "captured export snapshot: {} columns, {} rows, totals={}, expenses={}",
            columns.len(),
            rows.len(),
            totals.is_some(),
            expenses.is_some()
        );

        Ok(ExportTable {
            title: config.letterhead.title_line().to_string(),
            identity: config.letterhead.identity_line(),
            currency: currency.clone(),
            expenses,
            columns: columns
                .iter()
                .map(|column| ExportColumn {
                    id: column.id().to_string(),
                    header: column.header().to_string(),
                    width: column.width_hint(),
                })
                .collect(),
            rows,
            totals,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// Body cell texts, row by row.
    pub fn body_texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.text.as_str()).collect())
            .collect()
    }

    /// Width in characters for column `index`: the hint, else the widest text
    /// among header, body and totals.
    pub fn column_width(&self, index: usize) -> f64 {
        if let Some(width) = self.columns[index].width {
            return width;
        }
        let widest = std::iter::once(self.columns[index].header.as_str())
            .chain(self.rows.iter().map(|row| row[index].text.as_str()))
            .chain(self.totals.iter().map(|totals| totals[index].text.as_str()))
            .map(|text| text.chars().count())
            .max()
            .unwrap_or(0);
        (widest as f64 + 2.0).clamp(8.0, 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letterhead::{ExpenseLine, Letterhead};
    use tabula_engine::{Record, TableConfig};

    fn controller() -> TableController<Record> {
        let schema = vec![
            ColumnSpec::field("SCRIP", "Scrip"),
            ColumnSpec::field("QTY", "Quantity").summable(),
            ColumnSpec::field("AMOUNT", "Amount").currency().summable(),
            ColumnSpec::field("NOTE", "Note").deselected(),
        ];
        let rows = vec![
            Record::new().with("SCRIP", "TCS").with("QTY", 2).with("AMOUNT", 7000.0),
            Record::new().with("SCRIP", "INFY").with("QTY", "007").with("AMOUNT", -1500.25),
            Record::new().with("SCRIP", "WIPRO").with("QTY", 1.5).with("AMOUNT", 120000.0),
        ];
        TableController::new(schema, rows, TableConfig::default()).unwrap()
    }

    fn config() -> ExportConfig {
        ExportConfig::default().with_letterhead(Letterhead::new("Acme Capital", "R. Iyer", "C-42"))
    }

    #[test]
    fn test_capture_uses_visible_columns_and_all_pages() {
        let mut table = controller();
        table.set_page_size(1).unwrap();
        table.set_sort("SCRIP").unwrap();

        let snapshot = ExportTable::capture(&table, &config(), None).unwrap();
        assert_eq!(snapshot.headers(), vec!["Scrip", "Quantity", "Amount"]);
        assert_eq!(
            snapshot.body_texts(),
            vec![
                vec!["INFY", "007", "-₹1,500.25"],
                vec!["TCS", "2", "₹7,000.00"],
                vec!["WIPRO", "1.5", "₹1,20,000.00"],
            ]
        );
        assert_eq!(snapshot.title, "Acme Capital");
        assert_eq!(snapshot.identity, "Name: R. Iyer / Client ID: C-42");
    }

    #[test]
    fn test_only_plain_numbers_carry_a_number() {
        let snapshot = ExportTable::capture(&controller(), &config(), None).unwrap();
        assert_eq!(snapshot.rows[0][1].number, Some(2.0));
        // Leading zero stays text
        assert_eq!(snapshot.rows[1][1].number, None);
        // Currency text is not a plain number
        assert_eq!(snapshot.rows[0][2].number, None);
    }

    #[test]
    fn test_totals_row() {
        let snapshot = ExportTable::capture(&controller(), &config(), None).unwrap();
        let totals: Vec<&str> = snapshot
            .totals
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(totals, vec!["Total", "3.5", "₹1,25,499.75"]);
    }

    #[test]
    fn test_totals_label_skips_leading_summable_column() {
        let schema = vec![
            ColumnSpec::field("AMOUNT", "Amount").currency().summable(),
            ColumnSpec::field("SCRIP", "Scrip"),
            ColumnSpec::field("NOTE", "Note"),
        ];
        let rows = vec![Record::new().with("AMOUNT", 10.0).with("SCRIP", "TCS")];
        let table = TableController::new(schema, rows, TableConfig::default()).unwrap();

        let snapshot = ExportTable::capture(&table, &config(), None).unwrap();
        let totals: Vec<&str> = snapshot
            .totals
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(totals, vec!["₹10.00", "Total", ""]);
    }

    #[test]
    fn test_column_width_includes_totals() {
        let schema = vec![
            ColumnSpec::field("SCRIP", "Scrip"),
            ColumnSpec::field("AMOUNT", "Amt").currency().summable(),
        ];
        let rows = (0..40)
            .map(|i| Record::new().with("SCRIP", format!("S{i}")).with("AMOUNT", 99_999_999.0))
            .collect();
        let table = TableController::new(schema, rows, TableConfig::default()).unwrap();

        let snapshot = ExportTable::capture(&table, &config(), None).unwrap();
        let total = &snapshot.totals.as_ref().unwrap()[1].text;
        assert_eq!(total, "₹3,99,99,99,960.00");
        // Body cells are "₹9,99,99,999.00"; the total is three characters wider
        assert_eq!(snapshot.column_width(1), total.chars().count() as f64 + 2.0);
    }

    #[test]
    fn test_expenses_rendered_with_currency() {
        let expenses = Expenses::summed(vec![ExpenseLine::new("Brokerage", 40.0), ExpenseLine::new("Refund", -15.5)], 2);
        let snapshot = ExportTable::capture(&controller(), &config(), Some(&expenses)).unwrap();
        let block = snapshot.expenses.unwrap();
        assert_eq!(block.title, "Expenses");
        assert_eq!(block.lines[1].text, "-₹15.50");
        assert_eq!(block.total.label, "Total");
        assert_eq!(block.total.text, "₹24.50");
    }

    #[test]
    fn test_no_visible_columns_is_an_error() {
        let schema = vec![ColumnSpec::<Record>::field("A", "A").deselected()];
        let table = TableController::new(schema, Vec::new(), TableConfig::default()).unwrap();
        assert!(matches!(
            ExportTable::capture(&table, &config(), None),
            Err(ExportError::NoColumns)
        ));
    }
}
