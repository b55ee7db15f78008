//! Document projection tests for propview
//!
//! Tests for:
//! - Block order of the system proposal and the itemized quote
//! - Page furniture (header lines, running footer, file names)
//! - Placeholder substitution for missing assets

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::date;
use propview::persistence::default_snapshot;
use propview::projection::{
    project_itemized_quote, project_system_proposal, Asset, AssetBundle, ContentPlan,
    DirAssetLoader,
};
use propview::{ContentBlock, Document, EditorConfig, ParagraphStyle, SectionRef};

fn headings(doc: &Document) -> Vec<&str> {
    doc.blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn paragraphs(doc: &Document) -> Vec<&str> {
    doc.blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Paragraph { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn system_proposal(assets: &AssetBundle) -> Document {
    let plan = ContentPlan::system_proposal(date());
    project_system_proposal(&default_snapshot(), &plan, assets, &EditorConfig::default())
}

fn access_control_quote(assets: &AssetBundle) -> Document {
    let plan = ContentPlan::access_control_quote(date());
    project_itemized_quote(
        &default_snapshot(),
        SectionRef::AccessControl,
        &plan,
        assets,
        &EditorConfig::default(),
    )
}

fn logo_bundle() -> AssetBundle {
    let mut assets = AssetBundle::new();
    assets.insert("logo.png", Asset::new("image/png", vec![0x89, b'P', b'N', b'G']));
    assets
}

// ============================================================================
// System proposal
// ============================================================================

#[test]
fn test_system_proposal_section_order() {
    let doc = system_proposal(&logo_bundle());
    let titles = headings(&doc);

    let position = |needle: &str| {
        titles
            .iter()
            .position(|t| t.contains(needle))
            .unwrap_or_else(|| panic!("missing heading {needle}: {titles:?}"))
    };
    assert!(position("Transformación") < position("Hardware"));
    assert!(position("Hardware") < position("Retorno"));
    assert!(position("Retorno") < position("Términos"));
}

#[test]
fn test_system_proposal_starts_with_logo() {
    let doc = system_proposal(&logo_bundle());
    match &doc.blocks[0] {
        ContentBlock::Image { asset, mime, data } => {
            assert_eq!(asset, "logo.png");
            assert_eq!(mime, "image/png");
            assert!(!data.is_empty());
        }
        other => panic!("expected logo image, got {other:?}"),
    }
}

#[test]
fn test_missing_logo_becomes_placeholder() {
    let doc = system_proposal(&AssetBundle::new());
    assert!(matches!(
        &doc.blocks[0],
        ContentBlock::ImagePlaceholder { asset, .. } if asset == "logo.png"
    ));
}

#[test]
fn test_dir_loader_missing_file_becomes_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let plan = ContentPlan::system_proposal(date());
    let doc = project_system_proposal(
        &default_snapshot(),
        &plan,
        &DirAssetLoader::new(dir.path()),
        &EditorConfig::default(),
    );
    assert!(matches!(&doc.blocks[0], ContentBlock::ImagePlaceholder { .. }));
}

#[test]
fn test_system_proposal_has_a_page_break_and_signature() {
    let doc = system_proposal(&logo_bundle());
    assert_eq!(
        doc.blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::PageBreak))
            .count(),
        1
    );
    assert!(matches!(doc.blocks.last(), Some(ContentBlock::SignatureLine { .. })));
}

#[test]
fn test_system_proposal_furniture() {
    let doc = system_proposal(&logo_bundle());
    assert_eq!(doc.file_name, "Propuesta_Premium_CCTV_JEIVIAN_2026-03-09.pdf");
    assert!(doc.header_lines.iter().any(|l| l == "FECHA: 09/03/2026"));
    assert_eq!(
        doc.footer.center_for(2, 5),
        "JEIVIAN Smart Security Solutions | Pág. 2 de 5"
    );
    assert!(doc.footer.right.ends_with("09/03/2026"));
}

#[test]
fn test_roi_tiles_follow_config_horizon() {
    let mut config = EditorConfig::default();
    config.roi.years = 7;
    let plan = ContentPlan::system_proposal(date());
    let doc = project_system_proposal(&default_snapshot(), &plan, &AssetBundle::new(), &config);

    let labels: Vec<&str> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::MetricTile { label, .. } => Some(label.as_str()),
            _ => None,
        })
        .collect();
    assert!(labels.contains(&"VAN 7 AÑOS"));
    assert!(labels.contains(&"RECUPERACIÓN"));
}

#[test]
fn test_projection_is_deterministic() {
    let first = system_proposal(&logo_bundle());
    let second = system_proposal(&logo_bundle());
    assert_eq!(first, second);
}

// ============================================================================
// Itemized quote
// ============================================================================

#[test]
fn test_access_control_quote_table() {
    let doc = access_control_quote(&AssetBundle::new());
    let snapshot = default_snapshot();

    let (rows, footer) = doc
        .blocks
        .iter()
        .find_map(|b| match b {
            ContentBlock::Table { rows, footer, .. } => Some((rows, footer)),
            _ => None,
        })
        .expect("item table");
    assert_eq!(rows.len(), snapshot.access_control.items.len());
    assert_eq!(rows[0][0], "1");
    let footer = footer.as_ref().unwrap();
    assert_eq!(footer[4], "SUBTOTAL");
}

#[test]
fn test_access_control_quote_tax_and_kit() {
    let doc = access_control_quote(&AssetBundle::new());
    let texts = paragraphs(&doc);
    assert!(texts.iter().any(|t| t.starts_with("IVA 15%")));
    assert!(texts
        .iter()
        .any(|t| t.contains("UA-Hub") && t.contains("10x Touch Pass")));
}

#[test]
fn test_access_control_quote_terms_and_signature() {
    let doc = access_control_quote(&AssetBundle::new());
    assert!(doc.blocks.iter().any(|b| matches!(
        b,
        ContentBlock::Paragraph { text, style: ParagraphStyle::Emphasis } if text == "1. Validez:"
    )));
    match doc.blocks.last() {
        Some(ContentBlock::SignatureLine {
            left_label,
            right_caption,
            ..
        }) => {
            assert_eq!(left_label, "Aprobado por:");
            assert_eq!(right_caption.as_deref(), Some("JEIVIAN Smart Security"));
        }
        other => panic!("expected signature line, got {other:?}"),
    }
}

#[test]
fn test_access_control_quote_furniture() {
    let doc = access_control_quote(&AssetBundle::new());
    assert_eq!(doc.file_name, "Propuesta_Control_Acceso_JEIVIAN_2026-03-09.pdf");
    assert_eq!(doc.footer.center_for(1, 2), "Pág. 1 de 2");
    assert_eq!(doc.footer.right, "Generado: 09/03/2026");
}

#[test]
fn test_infrastructure_quote_has_no_tax_line() {
    let plan = ContentPlan::access_control_quote(date());
    let doc = project_itemized_quote(
        &default_snapshot(),
        SectionRef::Infrastructure,
        &plan,
        &AssetBundle::new(),
        &EditorConfig::default(),
    );
    assert!(!paragraphs(&doc).iter().any(|t| t.starts_with("IVA")));
}
