//! Spreadsheet export of the editable grids.
//!
//! A [`GridTable`] is what a grid shows for one collection: its columns, one
//! row per record and the pinned TOTAL row. It is written out as CSV or as a
//! single-sheet XLSX.

mod csv;
mod sheet_writer;
mod xlsx;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::finance::{camera_totals, compute_totals};
use crate::numfmt::round_cents;
use crate::types::{CollectionRef, ProposalSnapshot, SectionRef};

pub use csv::write_csv;
pub use xlsx::write_xlsx;

/// One grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridColumn {
    /// Persisted JSON key of the column.
    pub field: &'static str,
    pub header: &'static str,
    /// Relative column width.
    pub width: u8,
}

const fn column(field: &'static str, header: &'static str, width: u8) -> GridColumn {
    GridColumn {
        field,
        header,
        width,
    }
}

const LINE_ITEM_COLUMNS: [GridColumn; 5] = [
    column("componente", "Componente", 24),
    column("descripcion", "Descripción", 40),
    column("cantidad", "Cant.", 8),
    column("precioUnitario", "P. Unit.", 12),
    column("total", "Total", 14),
];

const BENEFIT_COLUMNS: [GridColumn; 4] = [
    column("beneficio", "Beneficio", 28),
    column("impacto", "Impacto", 10),
    column("ahorro", "Ahorro", 12),
    column("descripcion", "Descripción", 40),
];

const ROI_COLUMNS: [GridColumn; 3] = [
    column("concepto", "Concepto", 28),
    column("ahorroAnual", "Ahorro Anual", 14),
    column("descripcion", "Descripción", 40),
];

const LOCATION_COLUMNS: [GridColumn; 4] = [
    column("ubicacion", "Ubicación", 24),
    column("proposito", "Propósito", 36),
    column("camarasAnalogicas", "Cám. Analógicas", 14),
    column("camarasIP", "Cámaras IP", 12),
];

/// Columns of the grid editing `collection`.
pub fn grid_columns(collection: CollectionRef) -> &'static [GridColumn] {
    match collection {
        CollectionRef::Quotation | CollectionRef::AccessControl | CollectionRef::Infrastructure => {
            &LINE_ITEM_COLUMNS
        }
        CollectionRef::Benefits => &BENEFIT_COLUMNS,
        CollectionRef::Roi => &ROI_COLUMNS,
        CollectionRef::Locations => &LOCATION_COLUMNS,
    }
}

/// Title of a grid, used as sheet name and in file names.
pub fn grid_title(collection: CollectionRef) -> &'static str {
    match collection {
        CollectionRef::Quotation => SectionRef::Quotation.title(),
        CollectionRef::AccessControl => SectionRef::AccessControl.title(),
        CollectionRef::Infrastructure => SectionRef::Infrastructure.title(),
        CollectionRef::Benefits => "Beneficios",
        CollectionRef::Roi => "Desglose de Ahorros",
        CollectionRef::Locations => "Ubicaciones",
    }
}

/// A cell value. Numbers stay numeric in XLSX.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    fn empty() -> Self {
        Self::Text(String::new())
    }
}

/// Rows of one grid plus its pinned footer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable {
    pub title: &'static str,
    pub columns: &'static [GridColumn],
    pub rows: Vec<Vec<CellValue>>,
    /// The pinned TOTAL row.
    pub footer: Vec<CellValue>,
}

impl GridTable {
    /// Build the grid of `collection` from a snapshot.
    pub fn from_snapshot(snapshot: &ProposalSnapshot, collection: CollectionRef) -> Self {
        let section = match collection {
            CollectionRef::Quotation => Some(SectionRef::Quotation),
            CollectionRef::AccessControl => Some(SectionRef::AccessControl),
            CollectionRef::Infrastructure => Some(SectionRef::Infrastructure),
            _ => None,
        };
        let (rows, footer) = if let Some(section) = section {
            let items = snapshot.line_items(section);
            let rows = items
                .iter()
                .map(|item| {
                    vec![
                        CellValue::text(&item.name),
                        CellValue::text(&item.description),
                        CellValue::Number(item.quantity),
                        CellValue::Number(item.unit_price),
                        CellValue::Number(round_cents(item.total())),
                    ]
                })
                .collect();
            let subtotal = compute_totals(items, 0.0).subtotal;
            let footer = vec![
                CellValue::text("TOTAL"),
                CellValue::empty(),
                CellValue::empty(),
                CellValue::empty(),
                CellValue::Number(subtotal),
            ];
            (rows, footer)
        } else {
            match collection {
                CollectionRef::Benefits => {
                    let rows = snapshot
                        .benefits
                        .iter()
                        .map(|b| {
                            vec![
                                CellValue::text(&b.benefit),
                                CellValue::text(&b.impact),
                                CellValue::Number(b.saving),
                                CellValue::text(&b.description),
                            ]
                        })
                        .collect();
                    let total: f64 = snapshot.benefits.iter().map(|b| b.saving).sum();
                    let footer = vec![
                        CellValue::text("TOTAL"),
                        CellValue::empty(),
                        CellValue::Number(round_cents(total)),
                        CellValue::empty(),
                    ];
                    (rows, footer)
                }
                CollectionRef::Roi => {
                    let rows = snapshot
                        .roi
                        .iter()
                        .map(|r| {
                            vec![
                                CellValue::text(&r.concept),
                                CellValue::Number(r.annual_saving),
                                CellValue::text(&r.description),
                            ]
                        })
                        .collect();
                    let total: f64 = snapshot.roi.iter().map(|r| r.annual_saving).sum();
                    let footer = vec![
                        CellValue::text("TOTAL ANUAL"),
                        CellValue::Number(round_cents(total)),
                        CellValue::empty(),
                    ];
                    (rows, footer)
                }
                _ => {
                    let rows = snapshot
                        .locations
                        .iter()
                        .map(|l| {
                            vec![
                                CellValue::text(&l.name),
                                CellValue::text(&l.purpose),
                                CellValue::Number(f64::from(l.analog_camera_count)),
                                CellValue::Number(f64::from(l.ip_camera_count)),
                            ]
                        })
                        .collect();
                    let (analog, ip) = camera_totals(&snapshot.locations);
                    let footer = vec![
                        CellValue::text("TOTAL"),
                        CellValue::empty(),
                        CellValue::Number(f64::from(analog)),
                        CellValue::Number(f64::from(ip)),
                    ];
                    (rows, footer)
                }
            }
        };
        Self {
            title: grid_title(collection),
            columns: grid_columns(collection),
            rows,
            footer,
        }
    }
}

/// `{title}_{yyyy-mm-dd}.{ext}` with whitespace runs in the title as `_`.
pub fn export_file_name(title: &str, date: NaiveDate, ext: &str) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{title}_{}.{ext}", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Csv => "text/csv;charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// A generated spreadsheet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Export the grid of one collection.
pub fn export_grid(
    snapshot: &ProposalSnapshot,
    collection: CollectionRef,
    format: SheetFormat,
    date: NaiveDate,
) -> Result<SheetExport, GenerationError> {
    let table = GridTable::from_snapshot(snapshot, collection);
    let bytes = match format {
        SheetFormat::Csv => write_csv(&table).into_bytes(),
        SheetFormat::Xlsx => write_xlsx(&table)?,
    };
    tracing::info!(
        collection = ?collection,
        rows = table.rows.len(),
        bytes = bytes.len(),
        "grid exported"
    );
    Ok(SheetExport {
        file_name: export_file_name(table.title, date, format.extension()),
        bytes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::persistence::default_snapshot;
    use test_case::test_case;

    #[test_case("Cotización CCTV", "csv" => "Cotización_CCTV_2026-02-03.csv")]
    #[test_case("  Control   de Acceso ", "xlsx" => "Control_de_Acceso_2026-02-03.xlsx")]
    #[test_case("ROI", "csv" => "ROI_2026-02-03.csv")]
    fn test_export_file_name(title: &str, ext: &str) -> String {
        export_file_name(title, NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(), ext)
    }

    #[test]
    fn test_line_item_grid_footer_is_subtotal() {
        let snapshot = default_snapshot();
        let table = GridTable::from_snapshot(&snapshot, CollectionRef::Quotation);
        assert_eq!(table.rows.len(), snapshot.quotation.items.len());
        let subtotal = compute_totals(&snapshot.quotation.items, 0.15).subtotal;
        assert_eq!(table.footer[0], CellValue::text("TOTAL"));
        assert_eq!(table.footer[4], CellValue::Number(subtotal));
    }

    #[test]
    fn test_location_grid_footer_counts_cameras() {
        let snapshot = default_snapshot();
        let table = GridTable::from_snapshot(&snapshot, CollectionRef::Locations);
        assert_eq!(table.footer[2], CellValue::Number(117.0));
        assert_eq!(table.footer[3], CellValue::Number(25.0));
    }

    #[test]
    fn test_every_row_matches_columns() {
        let snapshot = default_snapshot();
        for collection in [
            CollectionRef::Quotation,
            CollectionRef::AccessControl,
            CollectionRef::Infrastructure,
            CollectionRef::Benefits,
            CollectionRef::Roi,
            CollectionRef::Locations,
        ] {
            let table = GridTable::from_snapshot(&snapshot, collection);
            assert_eq!(table.footer.len(), table.columns.len());
            for row in &table.rows {
                assert_eq!(row.len(), table.columns.len(), "{collection:?}");
            }
        }
    }
}
