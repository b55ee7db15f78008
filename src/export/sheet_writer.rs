//! Generates worksheet XML from a [`GridTable`].
//!
//! Text cells use inline strings (`t="inlineStr"`) so no shared string table
//! is needed. Header and footer rows use cell style 1 (bold).

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::{CellValue, GridTable};

/// Style index of bold cells in `styles.xml`.
const BOLD_STYLE: u32 = 1;

/// Convert a 0-based column index to column letters (A, B, ..., Z, AA, ...).
pub(crate) fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        result.insert(0, char::from(b'A' + offset));
        n /= 26;
    }
    result
}

/// Write a complete worksheet XML string.
pub(crate) fn write_sheet_xml(table: &GridTable) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    out.push('\n');

    let row_count = table.rows.len() + 2;
    let col_count = u32::try_from(table.columns.len()).unwrap_or(u32::MAX);
    if col_count > 0 {
        let end_col = col_to_letter(col_count - 1);
        let _ = writeln!(out, "<dimension ref=\"A1:{end_col}{row_count}\"/>");
    }

    // Header row stays visible while scrolling.
    out.push_str("<sheetViews><sheetView workbookViewId=\"0\">");
    out.push_str("<pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>");
    out.push_str("</sheetView></sheetViews>\n");

    if !table.columns.is_empty() {
        out.push_str("<cols>\n");
        for (i, column) in table.columns.iter().enumerate() {
            let col1 = i + 1;
            let _ = writeln!(
                out,
                "<col min=\"{col1}\" max=\"{col1}\" width=\"{}\" customWidth=\"1\"/>",
                column.width
            );
        }
        out.push_str("</cols>\n");
    }

    out.push_str("<sheetData>\n");
    let header: Vec<CellValue> = table
        .columns
        .iter()
        .map(|c| CellValue::Text(c.header.to_string()))
        .collect();
    write_row(&mut out, 1, &header, Some(BOLD_STYLE));
    let mut row_num = 2;
    for row in &table.rows {
        write_row(&mut out, row_num, row, None);
        row_num += 1;
    }
    write_row(&mut out, row_num, &table.footer, Some(BOLD_STYLE));
    out.push_str("</sheetData>\n");

    out.push_str("</worksheet>");
    out
}

fn write_row(out: &mut String, row: usize, cells: &[CellValue], style: Option<u32>) {
    let _ = write!(out, "<row r=\"{row}\">");
    for (col, cell) in (0u32..).zip(cells) {
        write_cell(out, row, col, cell, style);
    }
    out.push_str("</row>\n");
}

/// Write a single `<c>` element. Empty text cells are skipped.
fn write_cell(out: &mut String, row: usize, col: u32, cell: &CellValue, style: Option<u32>) {
    if matches!(cell, CellValue::Text(s) if s.is_empty()) {
        return;
    }
    let _ = write!(out, "<c r=\"{}{row}\"", col_to_letter(col));
    if let Some(s) = style {
        let _ = write!(out, " s=\"{s}\"");
    }
    match cell {
        CellValue::Text(s) => {
            out.push_str(" t=\"inlineStr\"><is><t>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</t></is>");
        }
        CellValue::Number(n) => {
            let _ = write!(out, "><v>{n}</v>");
        }
    }
    out.push_str("</c>");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::export::grid_columns;
    use crate::types::CollectionRef;

    #[test]
    fn test_col_to_letter() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(701), "ZZ");
    }

    #[test]
    fn test_sheet_xml() {
        let table = GridTable {
            title: "Beneficios",
            columns: grid_columns(CollectionRef::Benefits),
            rows: vec![vec![
                CellValue::Text("Seguridad <24/7> & más".into()),
                CellValue::Text("Alto".into()),
                CellValue::Number(1500.5),
                CellValue::Text(String::new()),
            ]],
            footer: vec![
                CellValue::Text("TOTAL".into()),
                CellValue::Text(String::new()),
                CellValue::Number(1500.5),
                CellValue::Text(String::new()),
            ],
        };
        let xml = write_sheet_xml(&table);
        assert!(xml.contains("<dimension ref=\"A1:D3\"/>"));
        assert!(xml.contains("<c r=\"A1\" s=\"1\" t=\"inlineStr\"><is><t>Beneficio</t></is></c>"));
        assert!(xml.contains("Seguridad &lt;24/7&gt; &amp; más"));
        assert!(xml.contains("<c r=\"C2\"><v>1500.5</v></c>"));
        assert!(xml.contains("<c r=\"C3\" s=\"1\"><v>1500.5</v></c>"));
        assert!(!xml.contains("r=\"D2\""));
    }
}
