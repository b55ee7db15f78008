//! Grid export tests for propview
//!
//! Tests for:
//! - CSV output of every editable grid
//! - XLSX packaging (parts present, sheet contents)

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::io::{Cursor, Read};

use common::date;
use propview::export::{export_grid, grid_columns, CellValue, GridTable, SheetFormat};
use propview::persistence::default_snapshot;
use propview::CollectionRef;
use test_case::test_case;

const ALL: [CollectionRef; 6] = [
    CollectionRef::Quotation,
    CollectionRef::AccessControl,
    CollectionRef::Infrastructure,
    CollectionRef::Benefits,
    CollectionRef::Roi,
    CollectionRef::Locations,
];

fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    contents
}

// ============================================================================
// Grid tables
// ============================================================================

#[test]
fn test_every_grid_has_one_row_per_record() {
    let snapshot = default_snapshot();
    for collection in ALL {
        let table = GridTable::from_snapshot(&snapshot, collection);
        let expected = match collection {
            CollectionRef::Benefits => snapshot.benefits.len(),
            CollectionRef::Roi => snapshot.roi.len(),
            CollectionRef::Locations => snapshot.locations.len(),
            CollectionRef::Quotation => snapshot.quotation.items.len(),
            CollectionRef::AccessControl => snapshot.access_control.items.len(),
            CollectionRef::Infrastructure => snapshot.current_state.infrastructure.len(),
        };
        assert_eq!(table.rows.len(), expected, "{collection:?}");
        let width = grid_columns(collection).len();
        assert!(table.rows.iter().all(|r| r.len() == width));
        assert_eq!(table.footer.len(), width);
    }
}

#[test]
fn test_quotation_footer_is_subtotal() {
    let snapshot = default_snapshot();
    let table = GridTable::from_snapshot(&snapshot, CollectionRef::Quotation);
    let subtotal = propview::finance::compute_totals(&snapshot.quotation.items, 0.0).subtotal;
    assert_eq!(table.footer[0], CellValue::Text("TOTAL".into()));
    assert_eq!(table.footer.last(), Some(&CellValue::Number(subtotal)));
}

// ============================================================================
// CSV
// ============================================================================

#[test_case(CollectionRef::Quotation, "Cotización_CCTV_2026-03-09.csv" ; "quotation")]
#[test_case(CollectionRef::Roi, "Desglose_de_Ahorros_2026-03-09.csv" ; "roi")]
#[test_case(CollectionRef::Locations, "Ubicaciones_2026-03-09.csv" ; "locations")]
fn test_csv_file_names(collection: CollectionRef, expected: &str) {
    let export = export_grid(&default_snapshot(), collection, SheetFormat::Csv, date()).unwrap();
    assert_eq!(export.file_name, expected);
}

#[test]
fn test_csv_has_header_rows_and_total() {
    let snapshot = default_snapshot();
    let export = export_grid(&snapshot, CollectionRef::Roi, SheetFormat::Csv, date()).unwrap();
    let text = String::from_utf8(export.bytes).unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();

    assert_eq!(lines[0], "Concepto,Ahorro Anual,Descripción");
    assert_eq!(lines.len(), snapshot.roi.len() + 2);
    assert!(lines.last().unwrap().starts_with("TOTAL ANUAL,"));
}

// ============================================================================
// XLSX
// ============================================================================

#[test]
fn test_xlsx_is_a_workbook() {
    let export = export_grid(
        &default_snapshot(),
        CollectionRef::Locations,
        SheetFormat::Xlsx,
        date(),
    )
    .unwrap();
    assert!(export.file_name.ends_with(".xlsx"));
    assert_eq!(&export.bytes[..2], b"PK");

    let workbook = zip_entry(&export.bytes, "xl/workbook.xml");
    assert!(workbook.contains("name=\"Ubicaciones\""));

    let sheet = zip_entry(&export.bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("Cámaras IP"));
    assert!(sheet.contains("<v>"));
}

#[test]
fn test_xlsx_escapes_text() {
    let mut snapshot = default_snapshot();
    snapshot.benefits = snapshot
        .benefits
        .iter()
        .map(|b| {
            let mut b = b.clone();
            b.benefit = "Menos <robos> & pérdidas".into();
            b
        })
        .collect();
    let export = export_grid(&snapshot, CollectionRef::Benefits, SheetFormat::Xlsx, date()).unwrap();
    let sheet = zip_entry(&export.bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("Menos &lt;robos&gt; &amp; pérdidas"));
}
