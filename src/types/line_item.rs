use serde::{Deserialize, Serialize};

use super::{Draft, Patch, Record};
use crate::error::{ensure_finite_total, ensure_non_negative, ValidationError};

/// A priced line in a proposal section.
///
/// There is no stored total: [`LineItem::total`] is always
/// `quantity * unit_price`. A `total` key in older stored blobs is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: u32,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "componente", alias = "item")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: f64,
    #[serde(rename = "icono", default)]
    pub icon: String,
}

impl LineItem {
    /// Line total, recomputed on every read.
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

impl Record for LineItem {
    const COLLECTION: &'static str = "line items";

    fn id(&self) -> u32 {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("quantity", self.quantity)?;
        ensure_non_negative("unitPrice", self.unit_price)?;
        ensure_finite_total(self.quantity, self.unit_price)
    }
}

/// A line item about to be added; the collection allocates its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemDraft {
    pub category: String,
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub icon: String,
}

impl Default for LineItemDraft {
    /// The blank row the grid inserts on "add row".
    fn default() -> Self {
        Self {
            category: "NUEVO".into(),
            name: "Nuevo Item".into(),
            description: "Descripción del nuevo item".into(),
            quantity: 1.0,
            unit_price: 0.0,
            icon: "📦".into(),
        }
    }
}

impl Draft for LineItemDraft {
    type Record = LineItem;

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("quantity", self.quantity)?;
        ensure_non_negative("unitPrice", self.unit_price)?;
        ensure_finite_total(self.quantity, self.unit_price)
    }

    fn into_record(self, id: u32) -> LineItem {
        LineItem {
            id,
            category: self.category,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            icon: self.icon,
        }
    }
}

/// Field-level edit of a line item. `total` is derived and has no field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemPatch {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub icon: Option<String>,
}

impl Patch for LineItemPatch {
    type Record = LineItem;

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(quantity) = self.quantity {
            ensure_non_negative("quantity", quantity)?;
        }
        if let Some(unit_price) = self.unit_price {
            ensure_non_negative("unitPrice", unit_price)?;
        }
        Ok(())
    }

    fn apply(&self, item: &mut LineItem) {
        if let Some(ref category) = self.category {
            item.category.clone_from(category);
        }
        if let Some(ref name) = self.name {
            item.name.clone_from(name);
        }
        if let Some(ref description) = self.description {
            item.description.clone_from(description);
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_price) = self.unit_price {
            item.unit_price = unit_price;
        }
        if let Some(ref icon) = self.icon {
            item.icon.clone_from(icon);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_total_is_ignored() {
        let json = r#"{"id":1,"categoria":"CAM","componente":"Bullet","cantidad":2,"precioUnitario":10.5,"total":999}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.total(), 21.0);
        let out = serde_json::to_string(&item).unwrap();
        assert!(!out.contains("\"total\""));
    }

    #[test]
    fn test_infrastructure_alias() {
        let json = r#"{"id":3,"item":"DVR 16 canales","cantidad":4,"precioUnitario":350}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.name, "DVR 16 canales");
        assert_eq!(item.category, "");
    }

    #[test]
    fn test_patch_rejects_negative_price() {
        let patch = LineItemPatch {
            unit_price: Some(-3.0),
            ..LineItemPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_overflowing_total() {
        let draft = LineItemDraft {
            quantity: 1e200,
            unit_price: 1e200,
            ..LineItemDraft::default()
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Overflow { field: "total" })
        );
    }

    #[test]
    fn test_loaded_item_with_overflowing_total_is_invalid() {
        let json = r#"{"id":1,"componente":"X","cantidad":1e200,"precioUnitario":1e200}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert!(Record::validate(&item).is_err());
    }
}
