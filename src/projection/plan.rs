//! Caller-supplied content plans.
//!
//! Everything a projection needs beyond the snapshot lives here, including
//! the generation date, so a projection is a pure function of its inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// One hardware highlight in the system proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareHighlight {
    pub title: String,
    pub tag: String,
    pub description: String,
}

/// One business area in the impact section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactArea {
    pub area: String,
    pub title: String,
    pub benefit: String,
    pub metrics: String,
}

/// An investment phase: a titled subset of the quotation items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub title: String,
    /// Quotation item ids, in display order. Unknown ids are skipped.
    pub item_ids: Vec<u32>,
    pub accent: Rgb,
}

/// Labels of the cover metrics band that are not derived from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBand {
    pub resolution: String,
    pub intelligence: String,
    /// Retention of the proposed system, compared with the current one.
    pub target_recording_days: u32,
}

/// Which optional sections a projection emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sections {
    pub metrics: bool,
    pub hardware: bool,
    pub phases: bool,
    pub business_impact: bool,
    pub locations: bool,
    pub roi_analysis: bool,
    pub kit_breakdown: bool,
    pub terms: bool,
    pub signatures: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            metrics: true,
            hardware: true,
            phases: true,
            business_impact: true,
            locations: true,
            roi_analysis: true,
            kit_breakdown: true,
            terms: true,
            signatures: true,
        }
    }
}

/// Content plan of one generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPlan {
    /// Generation date stamped on the document and in its file name.
    pub date: NaiveDate,
    pub title: String,
    pub subtitle: String,
    /// One-sentence system summary (itemized quote).
    #[serde(default)]
    pub summary: String,
    /// Lead-in of the kit breakdown paragraph (itemized quote).
    #[serde(default)]
    pub kit_heading: String,
    /// Asset name of the logo, if the document shows one.
    #[serde(default)]
    pub logo_asset: Option<String>,
    pub metrics: MetricsBand,
    #[serde(default)]
    pub hardware: Vec<HardwareHighlight>,
    #[serde(default)]
    pub business_impact: Vec<ImpactArea>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub include: Sections,
}

fn hardware(title: &str, tag: &str, description: &str) -> HardwareHighlight {
    HardwareHighlight {
        title: title.into(),
        tag: tag.into(),
        description: description.into(),
    }
}

fn impact(area: &str, title: &str, benefit: &str, metrics: &str) -> ImpactArea {
    ImpactArea {
        area: area.into(),
        title: title.into(),
        benefit: benefit.into(),
        metrics: metrics.into(),
    }
}

impl ContentPlan {
    /// The stock CCTV system proposal.
    pub fn system_proposal(date: NaiveDate) -> Self {
        Self {
            date,
            title: "Propuesta Sistema CCTV IP + IA".into(),
            subtitle: "Sistema de Videovigilancia Inteligente 4K".into(),
            summary: String::new(),
            kit_heading: String::new(),
            logo_asset: Some("logo.png".into()),
            metrics: MetricsBand {
                resolution: "4K".into(),
                intelligence: "PREDICTIVA".into(),
                target_recording_days: 365,
            },
            hardware: vec![
                hardware(
                    "UVC G6 Bullet",
                    "Cámara 4K IA",
                    "Detección de largo alcance y visión nocturna ultra clara.",
                ),
                hardware(
                    "Protect ENVR",
                    "Almacenamiento",
                    "Grabación segura en espejo con 16 bahías de alta capacidad.",
                ),
                hardware(
                    "NeXT AI Key",
                    "Procesamiento",
                    "Búsqueda instantánea por lenguaje natural y reconocimiento facial.",
                ),
            ],
            business_impact: vec![
                impact(
                    "Gerencia",
                    "Control Ejecutivo Total",
                    "Dashboard unificado con acceso móvil seguro desde cualquier lugar del mundo.",
                    "Gestión remota de todas las sedes en una App.",
                ),
                impact(
                    "Seguridad",
                    "Protección Inteligente",
                    "Identificación humana y vehicular inmediata con alertas críticas al celular.",
                    "Respuesta ante incidentes 80% más eficiente.",
                ),
                impact(
                    "Legal",
                    "Evidencia Irrefutable",
                    "Video 4K disponible por meses para respaldo en auditorías y procesos legales.",
                    "Historial completo de más de 6 meses.",
                ),
                impact(
                    "Operaciones",
                    "Optimización de Tiempos",
                    "Encuentre eventos específicos en segundos en lugar de horas de revisión manual.",
                    "Búsqueda inteligente por color, marca o persona.",
                ),
            ],
            phases: vec![
                Phase {
                    title: "FASE 1: SISTEMA BASE & INTELIGENCIA IA".into(),
                    item_ids: vec![1, 2, 3, 4, 5],
                    accent: Rgb::ORANGE_500,
                },
                Phase {
                    title: "FASE 2: EXPANSIÓN & MÁXIMA RETENCIÓN".into(),
                    item_ids: vec![6, 7, 8],
                    accent: Rgb::EMERALD_500,
                },
            ],
            include: Sections::default(),
        }
    }

    /// The stock access-control itemized quote.
    pub fn access_control_quote(date: NaiveDate) -> Self {
        Self {
            date,
            title: "Propuesta Control de Acceso".into(),
            subtitle: "Sistema UniFi Access Profesional".into(),
            summary: "Sistema de control de acceso UniFi Access con lectores NFC/Bluetooth".into(),
            kit_heading: "Cada Kit UA-G3-SK-Pro incluye:".into(),
            logo_asset: None,
            metrics: MetricsBand {
                resolution: String::new(),
                intelligence: String::new(),
                target_recording_days: 0,
            },
            hardware: Vec::new(),
            business_impact: Vec::new(),
            phases: Vec::new(),
            include: Sections::default(),
        }
    }

    /// Date as printed on the page (`dd/mm/yyyy`).
    pub fn display_date(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    /// Date as used in file names (`yyyy-mm-dd`).
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
