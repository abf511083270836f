//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for Tabula integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::rc::Rc;

use calamine::{Data, Reader, Xlsx};
use tabula::{
    status_authorized, ColumnSpec, Envelope, ExportConfig, Letterhead, ManualClock, NoticeQueue, Record,
    TableConfig, TabularDataEngine,
};

/// Test harness owning an engine over the holdings fixture schema.
pub struct TestHarness {
    pub engine: TabularDataEngine<Record>,
    pub notices: NoticeQueue,
    pub clock: Rc<ManualClock>,
}

impl TestHarness {
    /// Create a harness with no rows loaded.
    pub fn new() -> Self {
        Self::with_schema(HoldingsFixture::schema())
    }

    pub fn with_schema(schema: Vec<ColumnSpec<Record>>) -> Self {
        let notices = NoticeQueue::new();
        let clock = Rc::new(ManualClock::new());
        let engine = TabularDataEngine::new(schema, TableConfig::default(), export_config())
            .unwrap()
            .with_notifier(notices.clone())
            .with_clock(clock.clone());
        TestHarness {
            engine,
            notices,
            clock,
        }
    }

    /// Create a harness loaded with the holdings fixture rows.
    pub async fn with_holdings() -> Self {
        let mut harness = Self::new();
        harness.load(HoldingsFixture::rows()).await;
        harness
    }

    /// Replace the dataset through the normal refresh path.
    pub async fn load(&mut self, rows: Vec<Record>) {
        self.engine
            .refresh(async move { Envelope::Rows(rows) }, status_authorized)
            .await
            .unwrap();
    }
}

pub fn export_config() -> ExportConfig {
    ExportConfig::default().with_letterhead(Letterhead::new("Acme Capital", "R. Iyer", "C-42"))
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Five declared columns: one disabled, one hidden, one deselected and one
/// dropped whenever the dataset contains a buy transaction.
pub struct HoldingsFixture;

impl HoldingsFixture {
    pub fn schema() -> Vec<ColumnSpec<Record>> {
        vec![
            ColumnSpec::field("SCRIP", "Scrip").disabled().bundle(["ISIN"]),
            ColumnSpec::field("ISIN", "ISIN").hidden(),
            ColumnSpec::field("STATUS", "Status").deselected(),
            ColumnSpec::field("AMOUNT", "Amount").currency().summable(),
            ColumnSpec::field("SELL_QTY", "Sell Quantity")
                .exclude_when_any(|row: &Record| row.get("TYPE").as_str() == Some("BUY")),
        ]
    }

    pub fn rows() -> Vec<Record> {
        vec![
            Record::new()
                .with("SCRIP", "INFY")
                .with("ISIN", "INE009A01021")
                .with("STATUS", "OPEN")
                .with("AMOUNT", 15000.0)
                .with("SELL_QTY", 4)
                .with("TYPE", "SELL"),
            Record::new()
                .with("SCRIP", "TCS, Ltd")
                .with("ISIN", "INE467B01029")
                .with("STATUS", "CLOSED")
                .with("AMOUNT", -1250.5)
                .with("SELL_QTY", 2)
                .with("TYPE", "SELL"),
            Record::new()
                .with("SCRIP", "007")
                .with("ISIN", "INE000000007")
                .with("STATUS", "OPEN")
                .with("AMOUNT", "2000")
                .with("TYPE", "BUY"),
        ]
    }

    /// `n` generated rows with no buy transactions.
    pub fn many(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .with("SCRIP", format!("S{i:04}"))
                    .with("STATUS", if i % 2 == 0 { "OPEN" } else { "CLOSED" })
                    .with("AMOUNT", i as f64 * 10.5)
                    .with("SELL_QTY", i)
            })
            .collect()
    }
}

// ============================================================================
// ARTIFACT READERS
// ============================================================================

/// Parse CSV bytes (after the byte-order mark) into rows of fields, skipping
/// blank separator lines.
pub fn read_csv(bytes: &[u8]) -> Vec<Vec<String>> {
    assert!(bytes.starts_with(tabula_export::UTF8_BOM), "CSV must start with a BOM");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(&bytes[tabula_export::UTF8_BOM.len()..]);
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect::<Vec<String>>())
        .filter(|row| !row.iter().all(String::is_empty))
        .collect()
}

/// Read the export sheet back as text. Numbers come back in general format.
pub fn read_xlsx(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range(tabula_export::SHEET_NAME).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => tabula_engine::format_general(*f),
                    Data::Int(i) => i.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

/// Rows from the column header row onwards, trailing empty cells trimmed.
pub fn table_section(rows: Vec<Vec<String>>, first_header: &str) -> Vec<Vec<String>> {
    let start = rows
        .iter()
        .position(|row| row.first().map(String::as_str) == Some(first_header))
        .expect("header row present");
    rows.into_iter()
        .skip(start)
        .map(|mut row| {
            while row.last().is_some_and(|cell| cell.is_empty()) {
                row.pop();
            }
            row
        })
        .collect()
}

/// True when `haystack` contains `needle`.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
