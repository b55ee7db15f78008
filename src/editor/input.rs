//! Grid cell edits.
//!
//! The grid widget reports a changed cell as `(row id, column field, text)`.
//! This module turns that into a typed [`Command`], parsing the text the
//! way the column expects. Field names are the grid's column fields, which
//! are also the persisted JSON keys.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ValidationError};
use crate::numfmt::CurrencyFormat;
use crate::types::{
    BenefitItem, BenefitPatch, CollectionRef, ColorTag, LineItem, LineItemPatch, Location,
    LocationPatch, Record, RoiItem, RoiItemPatch, SectionRef,
};

use super::command::Command;

/// A cell-value-changed event from the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub collection: CollectionRef,
    pub id: u32,
    pub field: String,
    pub value: String,
}

impl CellEdit {
    /// Translate the edit into a command. Numeric cells are read with
    /// `currency`, the format the grid displays them in.
    pub fn into_command(self, currency: &CurrencyFormat) -> Result<Command, ValidationError> {
        let CellEdit {
            collection,
            id,
            field,
            value,
        } = self;
        let section = match collection {
            CollectionRef::Quotation => Some(SectionRef::Quotation),
            CollectionRef::AccessControl => Some(SectionRef::AccessControl),
            CollectionRef::Infrastructure => Some(SectionRef::Infrastructure),
            _ => None,
        };
        if let Some(section) = section {
            return Ok(Command::UpdateLineItem {
                section,
                id,
                patch: line_item_patch(&field, value, currency)?,
            });
        }
        Ok(match collection {
            CollectionRef::Benefits => Command::UpdateBenefit {
                id,
                patch: benefit_patch(&field, value, currency)?,
            },
            CollectionRef::Roi => Command::UpdateRoiItem {
                id,
                patch: roi_patch(&field, value, currency)?,
            },
            _ => Command::UpdateLocation {
                id,
                patch: location_patch(&field, value)?,
            },
        })
    }
}

fn line_item_patch(
    field: &str,
    value: String,
    currency: &CurrencyFormat,
) -> Result<LineItemPatch, ValidationError> {
    let mut patch = LineItemPatch::default();
    match field {
        "categoria" => patch.category = Some(value),
        "componente" | "item" => patch.name = Some(value),
        "descripcion" => patch.description = Some(value),
        "icono" => patch.icon = Some(value),
        "cantidad" => patch.quantity = Some(parse_amount("quantity", &value, currency)?),
        "precioUnitario" => {
            patch.unit_price = Some(parse_amount("unitPrice", &value, currency)?);
        }
        "total" => return Err(read_only(field)),
        _ => return Err(unknown::<LineItem>(field)),
    }
    Ok(patch)
}

fn benefit_patch(
    field: &str,
    value: String,
    currency: &CurrencyFormat,
) -> Result<BenefitPatch, ValidationError> {
    let mut patch = BenefitPatch::default();
    match field {
        "beneficio" => patch.benefit = Some(value),
        "impacto" => patch.impact = Some(value),
        "descripcion" => patch.description = Some(value),
        "ahorro" => patch.saving = Some(parse_amount("saving", &value, currency)?),
        _ => return Err(unknown::<BenefitItem>(field)),
    }
    Ok(patch)
}

fn roi_patch(
    field: &str,
    value: String,
    currency: &CurrencyFormat,
) -> Result<RoiItemPatch, ValidationError> {
    let mut patch = RoiItemPatch::default();
    match field {
        "concepto" => patch.concept = Some(value),
        "descripcion" => patch.description = Some(value),
        "ahorroAnual" => {
            patch.annual_saving = Some(parse_amount("annualSaving", &value, currency)?);
        }
        _ => return Err(unknown::<RoiItem>(field)),
    }
    Ok(patch)
}

fn location_patch(field: &str, value: String) -> Result<LocationPatch, ValidationError> {
    let mut patch = LocationPatch::default();
    match field {
        "ubicacion" => patch.name = Some(value),
        "icono" => patch.icon = Some(value),
        "proposito" => patch.purpose = Some(value),
        "descripcion" => patch.description = Some(value),
        "camarasAnalogicas" => {
            patch.analog_camera_count = Some(parse_count("analogCameraCount", &value)?);
        }
        "camarasIP" => patch.ip_camera_count = Some(parse_count("ipCameraCount", &value)?),
        "color" => patch.color_tag = Some(parse_color(&value)?),
        _ => return Err(unknown::<Location>(field)),
    }
    Ok(patch)
}

/// Parse a money or quantity cell in the grid's display format.
fn parse_amount(
    field: &'static str,
    value: &str,
    currency: &CurrencyFormat,
) -> Result<f64, ValidationError> {
    let amount = currency
        .parse(value)
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })?;
    ensure_non_negative(field, amount)?;
    Ok(amount)
}

fn parse_count(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })
}

fn parse_color(value: &str) -> Result<ColorTag, ValidationError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase())).map_err(|_| {
        ValidationError::UnknownField {
            collection: Location::COLLECTION,
            field: format!("color={value}"),
        }
    })
}

fn read_only(field: &str) -> ValidationError {
    ValidationError::ReadOnlyField {
        field: field.to_string(),
    }
}

fn unknown<R: Record>(field: &str) -> ValidationError {
    ValidationError::UnknownField {
        collection: R::COLLECTION,
        field: field.to_string(),
    }
}
