//! FILENAME: core/export/src/xlsx_writer.rs
//! PURPOSE: Spreadsheet rendition of an export snapshot.
//! CONTEXT: Same layering as the CSV output. Banner lines are merged across
//! all table columns, the letterhead and header row are frozen, and expense
//! amounts are coloured by sign and carry a number format that displays
//! them exactly as the CSV and document renditions print them.

use log::debug;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet};
use tabula_engine::{format_decimal, CurrencyConfig, Grouping};

use crate::error::ExportError;
use crate::table::{ExportCell, ExportTable};

pub const SHEET_NAME: &str = "Export";

const AMOUNT_GREEN: u32 = 0x00_80_00;
const AMOUNT_RED: u32 = 0xC0_00_00;

/// Formats shared by every cell of one workbook.
struct SheetFormats<'a> {
    title: Format,
    identity: Format,
    bold: Format,
    currency: &'a CurrencyConfig,
}

impl<'a> SheetFormats<'a> {
    fn new(currency: &'a CurrencyConfig) -> Self {
        SheetFormats {
            title: Format::new()
                .set_bold()
                .set_font_size(14.0)
                .set_align(FormatAlign::Center),
            identity: Format::new()
                .set_bold()
                .set_font_size(11.0)
                .set_align(FormatAlign::Center),
            bold: Format::new().set_bold(),
            currency,
        }
    }

    /// Coloured by sign. Indian grouping depends on the magnitude, so the
    /// format is built per amount.
    fn amount(&self, value: f64) -> Format {
        let color = if value < 0.0 { AMOUNT_RED } else { AMOUNT_GREEN };
        Format::new()
            .set_num_format(currency_number_format(value, self.currency))
            .set_font_color(Color::RGB(color))
    }
}

/// Serialize `table` to XLSX bytes.
pub fn write_xlsx(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut xlsx = XlsxWorkbook::new();
    let formats = SheetFormats::new(&table.currency);
    let last_col = (table.column_count().max(1) - 1) as u16;

    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    // Set column widths (Excel uses character width)
    for col in 0..table.column_count() {
        worksheet.set_column_width(col as u16, table.column_width(col))?;
    }

    write_banner(worksheet, 0, last_col, &table.title, &formats.title)?;
    write_banner(worksheet, 1, last_col, &table.identity, &formats.identity)?;
    let mut row: u32 = 3;

    if let Some(expenses) = &table.expenses {
        worksheet.write_string_with_format(row, 0, &expenses.title, &formats.bold)?;
        row += 1;
        for line in &expenses.lines {
            worksheet.write_string(row, 0, &line.label)?;
            worksheet.write_number_with_format(row, 1, line.amount, &formats.amount(line.amount))?;
            row += 1;
        }
        worksheet.write_string_with_format(row, 0, &expenses.total.label, &formats.bold)?;
        worksheet.write_number_with_format(
            row,
            1,
            expenses.total.amount,
            &formats.amount(expenses.total.amount),
        )?;
        row += 2;
    }

    let header_row = row;
    for (col, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(header_row, col as u16, &column.header, &formats.bold)?;
    }
    // Keep the letterhead and column header visible while scrolling
    worksheet.set_freeze_panes(header_row + 1, 0)?;
    row += 1;

    for cells in &table.rows {
        write_cells(worksheet, row, cells, None)?;
        row += 1;
    }
    if let Some(totals) = &table.totals {
        write_cells(worksheet, row, totals, Some(&formats.bold))?;
    }

    debug!("xlsx export: {} body rows, header at row {}", table.rows.len(), header_row);
    Ok(xlsx.save_to_buffer()?)
}

/// Centered banner merged across the table width.
fn write_banner(
    worksheet: &mut Worksheet,
    row: u32,
    last_col: u16,
    text: &str,
    format: &Format,
) -> Result<(), ExportError> {
    if last_col == 0 {
        worksheet.write_string_with_format(row, 0, text, format)?;
    } else {
        worksheet.merge_range(row, 0, row, last_col, text, format)?;
    }
    Ok(())
}

fn write_cells(
    worksheet: &mut Worksheet,
    row: u32,
    cells: &[ExportCell],
    format: Option<&Format>,
) -> Result<(), ExportError> {
    for (col, cell) in cells.iter().enumerate() {
        let col = col as u16;
        match (cell.number, format) {
            (Some(n), Some(fmt)) => {
                worksheet.write_number_with_format(row, col, n, fmt)?;
            }
            (Some(n), None) => {
                worksheet.write_number(row, col, n)?;
            }
            (None, _) if cell.text.is_empty() => {}
            (None, Some(fmt)) => {
                worksheet.write_string_with_format(row, col, &cell.text, fmt)?;
            }
            (None, None) => {
                worksheet.write_string(row, col, &cell.text)?;
            }
        }
    }
    Ok(())
}

/// Excel number format showing `value` the way `format_currency` renders it.
fn currency_number_format(value: f64, currency: &CurrencyConfig) -> String {
    let places = currency.decimal_places;
    let decimal_part = if places > 0 {
        format!(".{}", "0".repeat(places as usize))
    } else {
        String::new()
    };
    let integer_part = match currency.grouping {
        Grouping::Western => "#,##0".to_string(),
        Grouping::Indian => indian_digit_pattern(value, places),
    };
    let symbol = &currency.symbol;
    format!("{symbol}{integer_part}{decimal_part};-{symbol}{integer_part}{decimal_part}")
}

/// Excel's `,` only groups in thousands, so lakh and crore separators are
/// written as literal commas placed for this amount's digit count.
fn indian_digit_pattern(value: f64, decimal_places: u8) -> String {
    let grouped = format_decimal(value.abs(), decimal_places, Some(Grouping::Indian));
    let integer = grouped.split('.').next().unwrap_or("0");
    let last = integer.len().saturating_sub(1);
    integer
        .char_indices()
        .map(|(i, c)| match c {
            ',' => "\\,",
            _ if i == last => "0",
            _ => "#",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ExpenseBlock, ExpenseRow, ExportColumn};
    use calamine::{Data, Reader, Xlsx};
    use std::io::{Cursor, Read};
    use tabula_engine::format_currency;

    fn snapshot(columns: &[&str]) -> ExportTable {
        ExportTable {
            title: "Acme Capital".to_string(),
            identity: "Name: R. Iyer / Client ID: C-42".to_string(),
            currency: CurrencyConfig::default(),
            expenses: None,
            columns: columns
                .iter()
                .map(|h| ExportColumn {
                    id: h.to_uppercase(),
                    header: h.to_string(),
                    width: None,
                })
                .collect(),
            rows: vec![columns
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    if i == 0 {
                        ExportCell::text("INFY")
                    } else {
                        ExportCell {
                            text: "12.5".to_string(),
                            number: Some(12.5),
                        }
                    }
                })
                .collect()],
            totals: None,
        }
    }

    fn read_back(bytes: Vec<u8>) -> calamine::Range<Data> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    #[test]
    fn test_layout_and_numbers() {
        let range = read_back(write_xlsx(&snapshot(&["Scrip", "Price"])).unwrap());

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Acme Capital".to_string())));
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("Name: R. Iyer / Client ID: C-42".to_string()))
        );
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("Scrip".to_string())));
        assert_eq!(range.get_value((3, 1)), Some(&Data::String("Price".to_string())));
        assert_eq!(range.get_value((4, 0)), Some(&Data::String("INFY".to_string())));
        assert_eq!(range.get_value((4, 1)), Some(&Data::Float(12.5)));
    }

    #[test]
    fn test_single_column_banner_is_not_merged() {
        let range = read_back(write_xlsx(&snapshot(&["Scrip"])).unwrap());
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Acme Capital".to_string())));
    }

    #[test]
    fn test_expenses_block_shifts_header() {
        let mut table = snapshot(&["Scrip", "Price"]);
        table.expenses = Some(ExpenseBlock {
            title: "Expenses".to_string(),
            lines: vec![ExpenseRow {
                label: "Refund".to_string(),
                amount: -15.5,
                text: "-₹15.50".to_string(),
            }],
            total: ExpenseRow {
                label: "Total".to_string(),
                amount: -15.5,
                text: "-₹15.50".to_string(),
            },
        });

        let range = read_back(write_xlsx(&table).unwrap());
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("Expenses".to_string())));
        assert_eq!(range.get_value((4, 1)), Some(&Data::Float(-15.5)));
        assert_eq!(range.get_value((5, 0)), Some(&Data::String("Total".to_string())));
        assert_eq!(range.get_value((7, 0)), Some(&Data::String("Scrip".to_string())));
    }

    fn currency(decimal_places: u8, grouping: Grouping) -> CurrencyConfig {
        CurrencyConfig {
            symbol: "₹".to_string(),
            decimal_places,
            grouping,
        }
    }

    /// The `formatCode` attributes registered in the workbook's style sheet.
    fn number_formats(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut styles = String::new();
        archive
            .by_name("xl/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        styles
            .split("formatCode=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(|code| code.replace("&quot;", "\"").replace("&gt;", ">").replace("&lt;", "<"))
            .collect()
    }

    #[test]
    fn test_currency_number_format() {
        let western = currency(0, Grouping::Western);
        assert_eq!(currency_number_format(123456.0, &western), "₹#,##0;-₹#,##0");

        let indian = currency(2, Grouping::Indian);
        assert_eq!(currency_number_format(1500.0, &indian), "₹#\\,##0.00;-₹#\\,##0.00");
        assert_eq!(
            currency_number_format(-12345678.0, &indian),
            "₹#\\,##\\,##\\,##0.00;-₹#\\,##\\,##\\,##0.00"
        );
        assert_eq!(currency_number_format(15.5, &currency(0, Grouping::Indian)), "₹#0;-₹#0");
    }

    #[test]
    fn test_expense_amounts_follow_currency_config() {
        let mut table = snapshot(&["Scrip", "Price"]);
        table.currency = currency(0, Grouping::Indian);
        let row = |amount: f64| ExpenseRow {
            label: "Brokerage".to_string(),
            amount,
            text: format_currency(amount, 0, &table.currency),
        };
        table.expenses = Some(ExpenseBlock {
            title: "Expenses".to_string(),
            lines: vec![row(123456.0)],
            total: row(123456.0),
        });
        assert_eq!(table.expenses.as_ref().unwrap().total.text, "₹1,23,456");

        let bytes = write_xlsx(&table).unwrap();
        let range = read_back(bytes.clone());
        assert_eq!(range.get_value((4, 1)), Some(&Data::Float(123456.0)));
        assert!(number_formats(&bytes).contains(&"₹#\\,##\\,##0;-₹#\\,##\\,##0".to_string()));
    }
}
