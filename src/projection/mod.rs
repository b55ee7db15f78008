//! Snapshot → content blocks.
//!
//! Both projections are pure: the same snapshot, plan, assets and config
//! always produce the same [`Document`]. Every number is formatted here; the
//! renderer only sees strings.
//!
//! A missing asset never fails a projection: the image is replaced by an
//! [`ContentBlock::ImagePlaceholder`] and a warning is logged.

mod assets;
mod plan;

use base64::{engine::general_purpose, Engine as _};

pub use assets::{mime_for, Asset, AssetBundle, AssetLoader, DirAssetLoader};
pub use plan::{ContentPlan, HardwareHighlight, ImpactArea, MetricsBand, Phase, Sections};

use crate::config::EditorConfig;
use crate::finance::{self, camera_reduction_pct, camera_totals, recording_improvement};
use crate::numfmt::{format_percent, format_quantity, round_cents, CurrencyFormat};
use crate::types::{
    Align, ContentBlock, Document, KitComponent, Note, ParagraphStyle, Payback, ProposalSnapshot,
    Rgb, RunningFooter, SectionRef, TableColumn,
};

/// Descriptions longer than this are cut in the itemized quote.
pub const DESCRIPTION_LIMIT: usize = 40;

/// `text` cut to [`DESCRIPTION_LIMIT`] characters, with `...` when cut.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_LIMIT {
        let head: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// `Propuesta_Premium_CCTV_JEIVIAN_2026-03-09.pdf`
pub fn system_proposal_file_name(short_name: &str, plan: &ContentPlan) -> String {
    format!("Propuesta_Premium_CCTV_{short_name}_{}.pdf", plan.iso_date())
}

/// `Propuesta_Control_Acceso_JEIVIAN_2026-03-09.pdf`
pub fn itemized_quote_file_name(short_name: &str, plan: &ContentPlan) -> String {
    format!("Propuesta_Control_Acceso_{short_name}_{}.pdf", plan.iso_date())
}

fn image_block(assets: &dyn AssetLoader, name: &str) -> ContentBlock {
    match assets.load(name) {
        Ok(asset) => ContentBlock::Image {
            asset: name.to_string(),
            mime: asset.mime,
            data: general_purpose::STANDARD.encode(&asset.bytes),
        },
        Err(e) => {
            tracing::warn!("using placeholder for {name}: {e}");
            ContentBlock::ImagePlaceholder {
                asset: name.to_string(),
                alt: "Logo".into(),
            }
        }
    }
}

fn notes_of(snapshot: &ProposalSnapshot, section: SectionRef) -> &[Note] {
    match section {
        SectionRef::Quotation => &snapshot.quotation.notes,
        SectionRef::AccessControl => &snapshot.access_control.notes,
        SectionRef::Infrastructure => &[],
    }
}

fn tile(label: &str, value: String, caption: &str) -> ContentBlock {
    ContentBlock::MetricTile {
        label: label.into(),
        value,
        caption: caption.into(),
    }
}

/// Signed change in camera count: a reduction prints as `-50%`, growth as
/// `+25%`.
fn camera_change_label(reduction_pct: i64) -> String {
    match reduction_pct {
        0 => "0%".to_string(),
        r if r > 0 => format!("-{r}%"),
        r => format!("+{}%", r.unsigned_abs()),
    }
}

/// The full CCTV system proposal.
pub fn project_system_proposal(
    snapshot: &ProposalSnapshot,
    plan: &ContentPlan,
    assets: &dyn AssetLoader,
    config: &EditorConfig,
) -> Document {
    let currency = &config.currency;
    let branding = &config.branding;
    let mut blocks = Vec::new();

    if let Some(ref logo) = plan.logo_asset {
        blocks.push(image_block(assets, logo));
    }

    if plan.include.metrics {
        let (analog, ip) = camera_totals(&snapshot.locations);
        let improvement = recording_improvement(
            snapshot.current_state.characteristics.recording_days,
            plan.metrics.target_recording_days,
        );
        blocks.push(ContentBlock::heading(2, "Impacto de la Transformación Digital"));
        blocks.push(tile(
            "EFICIENCIA",
            camera_change_label(camera_reduction_pct(analog, ip)),
            "Cámaras",
        ));
        blocks.push(tile(
            "RESPALDO",
            improvement.map_or_else(|| "—".to_string(), |x| format!("{x}x")),
            "Días",
        ));
        blocks.push(tile("CLARIDAD", plan.metrics.resolution.clone(), "Forense"));
        blocks.push(tile("VISIÓN", plan.metrics.intelligence.clone(), "IA Predictiva"));
    }

    if plan.include.hardware && !plan.hardware.is_empty() {
        blocks.push(ContentBlock::heading(2, "Ecosistema de Hardware Seleccionado"));
        for hw in &plan.hardware {
            blocks.push(ContentBlock::styled(
                format!("• {} ({})", hw.title, hw.tag),
                ParagraphStyle::Emphasis,
            ));
            blocks.push(ContentBlock::paragraph(hw.description.clone()));
        }
    }

    let quotation = finance::compute_totals(&snapshot.quotation.items, snapshot.quotation.tax_rate);

    if plan.include.phases {
        blocks.push(ContentBlock::heading(2, "Plan de Inversión Estratégica"));
        for phase in &plan.phases {
            blocks.push(phase_table(snapshot, phase, currency));
        }
        blocks.push(tile(
            "INVERSIÓN TOTAL NETO",
            currency.format(quotation.subtotal),
            &format!(
                "IVA {}: {} | Total: {}",
                format_percent(Some(snapshot.quotation.tax_rate * 100.0), 0),
                currency.format(quotation.tax),
                currency.format(quotation.total)
            ),
        ));
    }

    blocks.push(ContentBlock::PageBreak);

    if plan.include.business_impact && !plan.business_impact.is_empty() {
        blocks.push(ContentBlock::heading(2, "Impacto Directo por Área de Negocio"));
        for area in &plan.business_impact {
            blocks.push(ContentBlock::styled(
                format!("{} · {}", area.area.to_uppercase(), area.title),
                ParagraphStyle::Emphasis,
            ));
            blocks.push(ContentBlock::paragraph(area.benefit.clone()));
            blocks.push(ContentBlock::styled(area.metrics.clone(), ParagraphStyle::Fine));
        }
    }

    if plan.include.locations {
        let (_, ip_total) = camera_totals(&snapshot.locations);
        blocks.push(ContentBlock::heading(2, "Mapa de Instalación y Cobertura"));
        blocks.push(ContentBlock::Table {
            columns: vec![
                TableColumn::new("Ubicación", Align::Left, 3),
                TableColumn::new("Cámaras", Align::Center, 1),
                TableColumn::new("Propósito", Align::Left, 4),
            ],
            rows: snapshot
                .locations
                .iter()
                .map(|l| vec![l.name.clone(), l.ip_camera_count.to_string(), l.purpose.clone()])
                .collect(),
            footer: Some(vec!["TOTAL".into(), ip_total.to_string(), String::new()]),
            accent: Rgb::SLATE_700,
        });
    }

    if plan.include.roi_analysis {
        blocks.extend(roi_blocks(snapshot, config));
    }

    if plan.include.terms {
        blocks.extend(terms_blocks(notes_of(snapshot, SectionRef::Quotation), false));
    }

    if plan.include.signatures {
        blocks.push(ContentBlock::SignatureLine {
            left_label: "Aprobado por Cliente".into(),
            right_label: branding.company.clone(),
            left_caption: None,
            right_caption: None,
        });
    }

    Document {
        title: "PROPUESTA TECNOLÓGICA".into(),
        subtitle: plan.title.to_uppercase(),
        header_lines: vec![
            format!("FECHA: {}", plan.display_date()),
            format!("CLIENTE: {}", branding.client_label),
        ],
        file_name: system_proposal_file_name(&branding.short_name, plan),
        header_color: Rgb::SLATE_900,
        blocks,
        footer: RunningFooter {
            left: branding.document_code.clone(),
            center: format!("{} | Pág. {{page}} de {{pages}}", branding.footer_name),
            right: format!("{} | {}", branding.website, plan.display_date()),
        },
    }
}

fn phase_table(snapshot: &ProposalSnapshot, phase: &Phase, currency: &CurrencyFormat) -> ContentBlock {
    let mut subtotal = 0.0;
    let mut rows = Vec::with_capacity(phase.item_ids.len());
    for &id in &phase.item_ids {
        let Some(item) = snapshot.quotation.items.get(id) else {
            tracing::warn!(id, phase = %phase.title, "phase lists an unknown quotation item, skipped");
            continue;
        };
        subtotal += item.total();
        rows.push(vec![
            item.name.clone(),
            format!("{} ud", format_quantity(item.quantity)),
            currency.format(item.unit_price),
            currency.format(item.total()),
        ]);
    }
    ContentBlock::Table {
        columns: vec![
            TableColumn::new(phase.title.clone(), Align::Left, 6),
            TableColumn::new("Cant.", Align::Center, 1),
            TableColumn::new("P. Unit.", Align::Right, 2),
            TableColumn::new("SUBTOTAL", Align::Right, 2),
        ],
        rows,
        footer: Some(vec![
            "SUBTOTAL FASE".into(),
            String::new(),
            String::new(),
            currency.format(round_cents(subtotal)),
        ]),
        accent: phase.accent,
    }
}

fn roi_blocks(snapshot: &ProposalSnapshot, config: &EditorConfig) -> Vec<ContentBlock> {
    let metrics = match finance::derive_metrics(snapshot, &config.roi) {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::warn!("ROI analysis skipped: {e}");
            return Vec::new();
        }
    };
    let currency = &config.currency;
    let roi = &metrics.roi;
    let irr = roi.internal_rate_of_return;
    let irr_text = if irr.converged {
        format_percent(irr.rate_pct, 1)
    } else {
        format!("≈ {}", format_percent(irr.rate_pct, 1))
    };

    let mut blocks = vec![
        ContentBlock::heading(2, "Análisis de Retorno de Inversión"),
        tile(
            "RECUPERACIÓN",
            match roi.payback {
                Payback::Months(months) => format!("{months} meses"),
                Payback::Never => "Sin recuperación".into(),
            },
            "Payback",
        ),
        tile("ROI AÑO 1", format_percent(roi.roi_year1_pct, 1), "Retorno"),
        tile(
            &format!("VAN {} AÑOS", config.roi.years),
            currency.format(roi.net_present_value),
            &format!(
                "Tasa {}",
                format_percent(Some(config.roi.discount_rate * 100.0), 0)
            ),
        ),
        tile("TIR", irr_text, "Tasa interna"),
    ];
    blocks.push(ContentBlock::Table {
        columns: vec![
            TableColumn::new("Año", Align::Center, 1),
            TableColumn::new("Ahorro acumulado", Align::Right, 3),
            TableColumn::new("Posición neta", Align::Right, 3),
            TableColumn::new("ROI", Align::Right, 2),
        ],
        rows: roi
            .yearly_projection
            .iter()
            .map(|y| {
                vec![
                    y.year.to_string(),
                    currency.format(y.cumulative_savings),
                    currency.format(y.net_position),
                    format_percent(y.roi_pct, 1),
                ]
            })
            .collect(),
        footer: Some(vec![
            "Inversión".into(),
            currency.format(metrics.total_investment),
            "Ahorro anual".into(),
            currency.format(metrics.annual_savings),
        ]),
        accent: Rgb::EMERALD_500,
    });
    blocks
}

fn terms_blocks(notes: &[Note], split_titles: bool) -> Vec<ContentBlock> {
    if notes.is_empty() {
        return Vec::new();
    }
    let mut blocks = vec![ContentBlock::heading(2, "Términos y Condiciones")];
    for (i, note) in notes.iter().enumerate() {
        let n = i + 1;
        if split_titles {
            blocks.push(ContentBlock::styled(
                format!("{n}. {}:", note.title),
                ParagraphStyle::Emphasis,
            ));
            blocks.push(ContentBlock::paragraph(note.body.clone()));
        } else {
            blocks.push(ContentBlock::styled(
                format!("{n}. {}: {}", note.title, note.body),
                ParagraphStyle::Fine,
            ));
        }
    }
    blocks
}

/// A single-table quote of one priced section.
pub fn project_itemized_quote(
    snapshot: &ProposalSnapshot,
    section: SectionRef,
    plan: &ContentPlan,
    assets: &dyn AssetLoader,
    config: &EditorConfig,
) -> Document {
    let currency = &config.currency;
    let branding = &config.branding;
    let items = snapshot.line_items(section);
    let totals = finance::compute_totals(items, snapshot.tax_rate(section));
    let mut blocks = Vec::new();

    if let Some(ref logo) = plan.logo_asset {
        blocks.push(image_block(assets, logo));
    }

    blocks.push(ContentBlock::heading(2, "Resumen del Sistema"));
    if !plan.summary.is_empty() {
        blocks.push(ContentBlock::paragraph(plan.summary.clone()));
    }
    blocks.push(ContentBlock::styled(
        format!("Inversión Total: {}", currency.format(totals.subtotal)),
        ParagraphStyle::Emphasis,
    ));

    blocks.push(ContentBlock::heading(2, "Detalle de Productos y Servicios"));
    blocks.push(ContentBlock::Table {
        columns: vec![
            TableColumn::new("#", Align::Center, 1),
            TableColumn::new("Componente", Align::Left, 4),
            TableColumn::new("Descripción", Align::Left, 6),
            TableColumn::new("Cant.", Align::Center, 2),
            TableColumn::new("P. Unit.", Align::Right, 3),
            TableColumn::new("Total", Align::Right, 3),
        ],
        rows: items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                vec![
                    (i + 1).to_string(),
                    item.name.clone(),
                    truncate_description(&item.description),
                    format_quantity(item.quantity),
                    currency.format(item.unit_price),
                    currency.format(item.total()),
                ]
            })
            .collect(),
        footer: Some(vec![
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "SUBTOTAL".into(),
            currency.format(totals.subtotal),
        ]),
        accent: Rgb::CYAN_600,
    });
    if section != SectionRef::Infrastructure {
        blocks.push(ContentBlock::styled(
            format!(
                "IVA {}: {} | Total con IVA: {}",
                format_percent(Some(snapshot.tax_rate(section) * 100.0), 0),
                currency.format(totals.tax),
                currency.format(totals.total)
            ),
            ParagraphStyle::Fine,
        ));
    }

    let kit: &[KitComponent] = if section == SectionRef::AccessControl {
        snapshot.access_control.kit_breakdown.as_slice()
    } else {
        &[]
    };
    if plan.include.kit_breakdown && !kit.is_empty() {
        let parts: Vec<String> = kit
            .iter()
            .map(|c| {
                if c.quantity > 1 {
                    format!("{}x {}", c.quantity, c.component)
                } else {
                    c.component.clone()
                }
            })
            .collect();
        blocks.push(ContentBlock::styled(plan.kit_heading.clone(), ParagraphStyle::Emphasis));
        blocks.push(ContentBlock::paragraph(parts.join(" + ")));
    }

    if plan.include.terms {
        blocks.extend(terms_blocks(notes_of(snapshot, section), true));
    }

    if plan.include.signatures {
        blocks.push(ContentBlock::SignatureLine {
            left_label: "Aprobado por:".into(),
            right_label: "Proveedor:".into(),
            left_caption: Some("Fecha: _______________".into()),
            right_caption: Some(branding.company.clone()),
        });
    }

    Document {
        title: plan.title.to_uppercase(),
        subtitle: plan.subtitle.clone(),
        header_lines: vec![format!("Fecha: {}", plan.display_date())],
        file_name: itemized_quote_file_name(&branding.short_name, plan),
        header_color: Rgb::CYAN_700,
        blocks,
        footer: RunningFooter {
            left: "* Precios no incluyen IVA | Entrega inmediata".into(),
            center: "Pág. {page} de {pages}".into(),
            right: format!("Generado: {}", plan.display_date()),
        },
    }
}
