//! FILENAME: core/export/src/pdf_writer.rs
//! PURPOSE: Serializes a document layout as a PDF 1.4 file.
//! CONTEXT: Uses the standard Helvetica fonts with WinAnsi encoding, so no
//! font data is embedded. Characters outside Latin-1 are written as the
//! configured fallback. Content streams are left uncompressed.

use std::io::Write;

use log::debug;

use crate::document::{text_origin, DocumentLayout, DocumentPage, LaidOutRow};
use crate::error::ExportError;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

/// Encode `text` as a PDF literal string body: Latin-1 bytes with `(`, `)`
/// and `\` escaped. Unencodable characters become `fallback`.
pub fn encode_text(text: &str, fallback: char) -> Vec<u8> {
    let fallback = latin1(fallback).unwrap_or(b'?');
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match latin1(c).unwrap_or(fallback) {
            byte @ (b'(' | b')' | b'\\') => {
                out.push(b'\\');
                out.push(byte);
            }
            byte => out.push(byte),
        }
    }
    out
}

fn latin1(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => None,
    }
}

/// Collects objects and their byte offsets for the cross-reference table.
struct PdfBuilder {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuilder {
    fn new(object_count: usize) -> Result<Self, ExportError> {
        let mut buf = Vec::new();
        buf.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;
        Ok(PdfBuilder {
            buf,
            offsets: vec![0; object_count + 1],
        })
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<(), ExportError> {
        self.offsets[id] = self.buf.len();
        writeln!(self.buf, "{id} 0 obj")?;
        self.buf.write_all(body)?;
        self.buf.write_all(b"\nendobj\n")?;
        Ok(())
    }

    fn stream(&mut self, id: usize, content: &[u8]) -> Result<(), ExportError> {
        let mut body = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.object(id, &body)
    }

    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let xref_offset = self.buf.len();
        write!(self.buf, "xref\n0 {}\n", self.offsets.len())?;
        self.buf.write_all(b"0000000000 65535 f \n")?;
        for offset in &self.offsets[1..] {
            writeln!(self.buf, "{offset:010} 00000 n ")?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.offsets.len()
        )?;
        Ok(self.buf)
    }
}

/// Serialize `layout` to PDF bytes.
pub fn write_pdf(layout: &DocumentLayout, title: &str, fallback: char) -> Result<Vec<u8>, ExportError> {
    let page_count = layout.pages.len();
    let page_id = |index: usize| FIRST_PAGE_ID + 2 * index;
    let mut pdf = PdfBuilder::new(FIRST_PAGE_ID - 1 + 2 * page_count)?;

    pdf.object(CATALOG_ID, format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes())?;

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_id(i))).collect();
    pdf.object(
        PAGES_ID,
        format!("<< /Type /Pages /Kids [{}] /Count {page_count} >>", kids.join(" ")).as_bytes(),
    )?;
    pdf.object(
        REGULAR_FONT_ID,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    pdf.object(
        BOLD_FONT_ID,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;

    let mut info = b"<< /Title (".to_vec();
    info.extend(encode_text(title, fallback));
    info.extend_from_slice(b") /Producer (tabula-export) >>");
    pdf.object(INFO_ID, &info)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let id = page_id(index);
        pdf.object(
            id,
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {REGULAR_FONT_ID} 0 R /F2 {BOLD_FONT_ID} 0 R >> >> \
                 /Contents {} 0 R >>",
                num(layout.width),
                num(layout.height),
                id + 1
            )
            .as_bytes(),
        )?;
        let content = page_content(layout, page, fallback)?;
        pdf.stream(id + 1, &content)?;
    }

    debug!("pdf export: {} pages", page_count);
    pdf.finish()
}

fn page_content(layout: &DocumentLayout, page: &DocumentPage, fallback: char) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();

    for run in &page.texts {
        text_op(&mut out, run.bold, run.size, run.x, layout.height - run.y, &run.text, fallback)?;
    }

    for row in &page.rows {
        row_ops(&mut out, layout, row, fallback)?;
    }
    Ok(out)
}

fn row_ops(out: &mut Vec<u8>, layout: &DocumentLayout, row: &LaidOutRow, fallback: char) -> Result<(), ExportError> {
    let size = layout.body_font_size;
    let bottom = layout.height - row.top - row.height;
    let baseline = bottom + (row.height - size) / 2.0 + size * 0.2;
    let bold = row.kind.is_bold();

    for cell in &row.cells {
        // Clip each cell to its band so long text never overprints a neighbour
        writeln!(
            out,
            "q {} {} {} {} re W n",
            num(cell.x),
            num(bottom),
            num(cell.width),
            num(row.height)
        )?;
        text_op(out, bold, size, text_origin(cell, size), baseline, &cell.text, fallback)?;
        out.write_all(b"Q\n")?;
    }

    if bold {
        // Rule under header and totals rows
        let left = row.cells.first().map(|c| c.x).unwrap_or(0.0);
        let right = row.cells.last().map(|c| c.x + c.width).unwrap_or(0.0);
        writeln!(out, "0.5 w {} {} m {} {} l S", num(left), num(bottom), num(right), num(bottom))?;
    }
    Ok(())
}

fn text_op(
    out: &mut Vec<u8>,
    bold: bool,
    size: f64,
    x: f64,
    y: f64,
    text: &str,
    fallback: char,
) -> Result<(), ExportError> {
    let font = if bold { "F2" } else { "F1" };
    write!(out, "BT /{font} {} Tf {} {} Td (", num(size), num(x), num(y))?;
    out.write_all(&encode_text(text, fallback))?;
    out.write_all(b") Tj ET\n")?;
    Ok(())
}

/// Compact decimal for content streams.
fn num(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
