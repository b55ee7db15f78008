//! CSV output of a [`GridTable`].

use super::{CellValue, GridTable};

/// Header, rows and footer as comma-separated lines (CRLF line endings).
pub fn write_csv(table: &GridTable) -> String {
    let mut out = String::with_capacity(64 * (table.rows.len() + 2));
    let header: Vec<&str> = table.columns.iter().map(|c| c.header).collect();
    push_line(&mut out, header.into_iter());
    for row in table.rows.iter().chain(std::iter::once(&table.footer)) {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        push_line(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => n.to_string(),
    }
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

/// Quote a field when it contains a separator, quote or line break.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                // Escaped quote
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}
