//! FILENAME: core/export/src/csv_writer.rs
//! PURPOSE: CSV rendition of an export snapshot.
//! CONTEXT: Output starts with a UTF-8 byte-order mark so spreadsheet tools
//! decode the currency glyph correctly. Blocks (title, identity, expenses,
//! table) are separated by blank lines.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::table::{ExportCell, ExportTable};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize `table` to CSV bytes.
pub fn write_csv(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let quote = |text: &str| quote_cell(text, &table.currency.symbol);
    let mut out = UTF8_BOM.to_vec();

    out = write_block(out, &[vec![quote(&table.title)]])?;
    out.push(b'\n');
    out = write_block(out, &[vec![quote(&table.identity)]])?;
    out.push(b'\n');

    if let Some(expenses) = &table.expenses {
        let mut records = vec![vec![quote(&expenses.title)]];
        records.extend(
            expenses
                .lines
                .iter()
                .chain(std::iter::once(&expenses.total))
                .map(|line| vec![quote(&line.label), quote(&line.text)]),
        );
        out = write_block(out, &records)?;
        out.push(b'\n');
    }

    let cells = |row: &[ExportCell]| row.iter().map(|cell| quote(&cell.text)).collect::<Vec<_>>();
    let mut records = vec![table.columns.iter().map(|c| quote(&c.header)).collect::<Vec<_>>()];
    records.extend(table.rows.iter().map(|row| cells(row)));
    if let Some(totals) = &table.totals {
        records.push(cells(totals));
    }
    write_block(out, &records)
}

/// Quote a cell containing a delimiter, quote, line break or the currency glyph.
pub fn quote_cell(text: &str, currency_symbol: &str) -> String {
    let needs_quotes = text.contains([',', '"', '\n', '\r'])
        || (!currency_symbol.is_empty() && text.contains(currency_symbol));
    if needs_quotes {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Append already-quoted records to `out`.
fn write_block(out: Vec<u8>, records: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(out);

    for record in records {
        writer.write_record(record)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
