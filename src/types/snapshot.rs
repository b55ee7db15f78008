use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Collection, Draft, LineItem, Patch, Record};
use crate::error::{ensure_non_negative, ensure_rate, ValidationError};

/// Read-only reference content (terms, legal notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub body: String,
}

/// One component of the per-door access-control kit. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitComponent {
    pub id: u32,
    #[serde(rename = "componente")]
    pub component: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Accent color of a location card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    #[default]
    Slate,
    Indigo,
    Cyan,
    Emerald,
    Amber,
    Rose,
    Violet,
}

/// A site covered by the installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: u32,
    #[serde(rename = "ubicacion")]
    pub name: String,
    #[serde(rename = "icono", default)]
    pub icon: String,
    #[serde(rename = "proposito", default)]
    pub purpose: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "camarasAnalogicas", default)]
    pub analog_camera_count: u32,
    #[serde(rename = "camarasIP", default)]
    pub ip_camera_count: u32,
    #[serde(rename = "color", default)]
    pub color_tag: ColorTag,
}

impl Record for Location {
    const COLLECTION: &'static str = "locations";

    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDraft {
    pub name: String,
    pub icon: String,
    pub purpose: String,
    pub description: String,
    pub analog_camera_count: u32,
    pub ip_camera_count: u32,
    pub color_tag: ColorTag,
}

impl Draft for LocationDraft {
    type Record = Location;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn into_record(self, id: u32) -> Location {
        Location {
            id,
            name: self.name,
            icon: self.icon,
            purpose: self.purpose,
            description: self.description,
            analog_camera_count: self.analog_camera_count,
            ip_camera_count: self.ip_camera_count,
            color_tag: self.color_tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub analog_camera_count: Option<u32>,
    pub ip_camera_count: Option<u32>,
    pub color_tag: Option<ColorTag>,
}

impl Patch for LocationPatch {
    type Record = Location;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn apply(&self, location: &mut Location) {
        if let Some(ref name) = self.name {
            location.name.clone_from(name);
        }
        if let Some(ref icon) = self.icon {
            location.icon.clone_from(icon);
        }
        if let Some(ref purpose) = self.purpose {
            location.purpose.clone_from(purpose);
        }
        if let Some(ref description) = self.description {
            location.description.clone_from(description);
        }
        if let Some(count) = self.analog_camera_count {
            location.analog_camera_count = count;
        }
        if let Some(count) = self.ip_camera_count {
            location.ip_camera_count = count;
        }
        if let Some(tag) = self.color_tag {
            location.color_tag = tag;
        }
    }
}

/// A qualitative business benefit with an estimated saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitItem {
    pub id: u32,
    #[serde(rename = "beneficio")]
    pub benefit: String,
    #[serde(rename = "impacto", default)]
    pub impact: String,
    #[serde(rename = "ahorro", default)]
    pub saving: f64,
    #[serde(rename = "descripcion", default)]
    pub description: String,
}

impl Record for BenefitItem {
    const COLLECTION: &'static str = "benefits";

    fn id(&self) -> u32 {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("saving", self.saving)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BenefitDraft {
    pub benefit: String,
    pub impact: String,
    pub saving: f64,
    pub description: String,
}

impl Draft for BenefitDraft {
    type Record = BenefitItem;

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("saving", self.saving)
    }

    fn into_record(self, id: u32) -> BenefitItem {
        BenefitItem {
            id,
            benefit: self.benefit,
            impact: self.impact,
            saving: self.saving,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BenefitPatch {
    pub benefit: Option<String>,
    pub impact: Option<String>,
    pub saving: Option<f64>,
    pub description: Option<String>,
}

impl Patch for BenefitPatch {
    type Record = BenefitItem;

    fn validate(&self) -> Result<(), ValidationError> {
        match self.saving {
            Some(saving) => ensure_non_negative("saving", saving),
            None => Ok(()),
        }
    }

    fn apply(&self, item: &mut BenefitItem) {
        if let Some(ref benefit) = self.benefit {
            item.benefit.clone_from(benefit);
        }
        if let Some(ref impact) = self.impact {
            item.impact.clone_from(impact);
        }
        if let Some(saving) = self.saving {
            item.saving = saving;
        }
        if let Some(ref description) = self.description {
            item.description.clone_from(description);
        }
    }
}

/// A recurring annual saving that feeds the ROI analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiItem {
    pub id: u32,
    #[serde(rename = "concepto")]
    pub concept: String,
    #[serde(rename = "ahorroAnual")]
    pub annual_saving: f64,
    #[serde(rename = "descripcion", default)]
    pub description: String,
}

impl Record for RoiItem {
    const COLLECTION: &'static str = "ROI items";

    fn id(&self) -> u32 {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("annualSaving", self.annual_saving)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoiItemDraft {
    pub concept: String,
    pub annual_saving: f64,
    pub description: String,
}

impl Draft for RoiItemDraft {
    type Record = RoiItem;

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("annualSaving", self.annual_saving)
    }

    fn into_record(self, id: u32) -> RoiItem {
        RoiItem {
            id,
            concept: self.concept,
            annual_saving: self.annual_saving,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoiItemPatch {
    pub concept: Option<String>,
    pub annual_saving: Option<f64>,
    pub description: Option<String>,
}

impl Patch for RoiItemPatch {
    type Record = RoiItem;

    fn validate(&self) -> Result<(), ValidationError> {
        match self.annual_saving {
            Some(saving) => ensure_non_negative("annualSaving", saving),
            None => Ok(()),
        }
    }

    fn apply(&self, item: &mut RoiItem) {
        if let Some(ref concept) = self.concept {
            item.concept.clone_from(concept);
        }
        if let Some(saving) = self.annual_saving {
            item.annual_saving = saving;
        }
        if let Some(ref description) = self.description {
            item.description.clone_from(description);
        }
    }
}

/// Recording characteristics of the installation being replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    #[serde(rename = "resolucion")]
    pub resolution: String,
    /// Days of footage the current system retains.
    #[serde(rename = "tiempoGrabacion")]
    pub recording_days: u32,
}

/// The installation as it exists today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    #[serde(rename = "infraestructura")]
    pub infrastructure: Collection<LineItem>,
    #[serde(rename = "caracteristicas")]
    pub characteristics: Characteristics,
}

/// A priced proposal section: editable items plus fixed reference content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedSection {
    pub items: Collection<LineItem>,
    #[serde(rename = "notas", default)]
    pub notes: Vec<Note>,
    #[serde(rename = "ivaRate")]
    pub tax_rate: f64,
    #[serde(rename = "categoriaColores", default)]
    pub category_colors: BTreeMap<String, String>,
    #[serde(rename = "kitDesglose", default, skip_serializing_if = "Vec::is_empty")]
    pub kit_breakdown: Vec<KitComponent>,
}

impl PricedSection {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure_rate("taxRate", self.tax_rate)?;
        self.items.validate()
    }
}

/// Which priced section a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionRef {
    Quotation,
    AccessControl,
    Infrastructure,
}

impl SectionRef {
    /// Section title as shown on screen and in export file names.
    pub fn title(self) -> &'static str {
        match self {
            Self::Quotation => "Cotización CCTV",
            Self::AccessControl => "Control de Acceso",
            Self::Infrastructure => "Infraestructura Actual",
        }
    }
}

/// Which collection a removal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionRef {
    Quotation,
    AccessControl,
    Infrastructure,
    Benefits,
    Roi,
    Locations,
}

impl From<SectionRef> for CollectionRef {
    fn from(section: SectionRef) -> Self {
        match section {
            SectionRef::Quotation => Self::Quotation,
            SectionRef::AccessControl => Self::AccessControl,
            SectionRef::Infrastructure => Self::Infrastructure,
        }
    }
}

/// Complete proposal state at one instant. The unit of persistence and of
/// document projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    #[serde(rename = "situacionActual")]
    pub current_state: CurrentState,
    #[serde(rename = "cotizacion")]
    pub quotation: PricedSection,
    #[serde(rename = "controlAcceso")]
    pub access_control: PricedSection,
    #[serde(rename = "ubicaciones")]
    pub locations: Collection<Location>,
    #[serde(rename = "beneficios")]
    pub benefits: Collection<BenefitItem>,
    pub roi: Collection<RoiItem>,
}

impl ProposalSnapshot {
    /// Line items of a priced section.
    pub fn line_items(&self, section: SectionRef) -> &Collection<LineItem> {
        match section {
            SectionRef::Quotation => &self.quotation.items,
            SectionRef::AccessControl => &self.access_control.items,
            SectionRef::Infrastructure => &self.current_state.infrastructure,
        }
    }

    pub(crate) fn line_items_mut(&mut self, section: SectionRef) -> &mut Collection<LineItem> {
        match section {
            SectionRef::Quotation => &mut self.quotation.items,
            SectionRef::AccessControl => &mut self.access_control.items,
            SectionRef::Infrastructure => &mut self.current_state.infrastructure,
        }
    }

    /// Tax rate applied to a section. The current infrastructure is untaxed.
    pub fn tax_rate(&self, section: SectionRef) -> f64 {
        match section {
            SectionRef::Quotation => self.quotation.tax_rate,
            SectionRef::AccessControl => self.access_control.tax_rate,
            SectionRef::Infrastructure => 0.0,
        }
    }

    /// Check every collection and rate in the snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.current_state.infrastructure.validate()?;
        self.quotation.validate()?;
        self.access_control.validate()?;
        self.locations.validate()?;
        self.benefits.validate()?;
        self.roi.validate()
    }
}
