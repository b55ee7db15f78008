//! Editor tests for propview
//!
//! Tests for:
//! - Command dispatch and id allocation
//! - Grid cell edits
//! - Autosave, explicit save and reset
//! - The document generation guard

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::BTreeSet;

use common::{collection, date, edited_default, memory_editor};
use propview::config::DEFAULT_STORAGE_KEY;
use propview::error::{GenerationError, ValidationError};
use propview::numfmt::CurrencyFormat;
use propview::persistence::{default_snapshot, MemoryStorage, StorageBackend};
use propview::{
    CellEdit, CollectionRef, Command, CommandOutcome, EditorConfig, LineItemDraft, LineItemPatch,
    ProposalEditor, RoiItemDraft, SectionRef,
};

fn ids(list: &[u32]) -> BTreeSet<u32> {
    list.iter().copied().collect()
}

fn cell(collection: CollectionRef, id: u32, field: &str, value: &str) -> CellEdit {
    CellEdit {
        collection,
        id,
        field: field.into(),
        value: value.into(),
    }
}

// ============================================================================
// Removal and id allocation
// ============================================================================

#[test]
fn test_remove_absent_id_is_noop() {
    let mut items = collection(&[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
    let before = items.clone();
    assert_eq!(items.remove(&ids(&[42])), 0);
    assert_eq!(items, before);
}

#[test]
fn test_editor_remove_absent_id_keeps_items() {
    let mut editor = memory_editor();
    let before = editor.snapshot().access_control.items.clone();
    let removed = editor.remove_items(CollectionRef::AccessControl, ids(&[999]));
    assert_eq!(removed, 0);
    assert_eq!(editor.snapshot().access_control.items, before);
}

#[test]
fn test_remove_absent_id_writes_nothing() {
    let mut editor = memory_editor();
    let before = editor.snapshot();
    editor.remove_items(CollectionRef::Roi, ids(&[999]));

    assert!(std::sync::Arc::ptr_eq(&before, &editor.snapshot()));
    assert!(!editor.is_dirty());
    assert!(editor
        .persistence()
        .storage()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .is_none());
}

#[test]
fn test_add_fails_when_ids_are_exhausted() {
    let blob = edited_default(&[], |root| {
        root["roi"][0]["id"] = serde_json::json!(u32::MAX);
    });
    let mut editor = memory_editor();
    editor.import_snapshot(&blob).unwrap();
    let before = editor.snapshot();

    let err = editor
        .dispatch(Command::AddRoiItem {
            draft: RoiItemDraft::default(),
        })
        .unwrap_err();
    assert!(matches!(err, ValidationError::IdSpaceExhausted { .. }));
    assert_eq!(*editor.snapshot(), *before);

    let stored = editor
        .persistence()
        .storage()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let mut storage = MemoryStorage::new();
    storage.set(DEFAULT_STORAGE_KEY, &stored).unwrap();
    let reopened = ProposalEditor::open(storage, EditorConfig::default());
    assert_eq!(*reopened.snapshot(), *before);
}

#[test]
fn test_sequential_adds_allocate_one_to_n() {
    let mut editor = memory_editor();
    let existing: BTreeSet<u32> = editor.snapshot().roi.ids().into_iter().collect();
    editor.remove_items(CollectionRef::Roi, existing);
    assert!(editor.snapshot().roi.is_empty());

    for _ in 0..5 {
        editor
            .dispatch(Command::AddRoiItem {
                draft: RoiItemDraft::default(),
            })
            .unwrap();
    }
    assert_eq!(editor.snapshot().roi.ids(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_ids_not_reused_after_interleaved_removals() {
    let mut editor = memory_editor();
    let section = SectionRef::AccessControl;
    let max = editor.snapshot().access_control.items.next_id().unwrap() - 1;

    let a = editor.add_item(section, LineItemDraft::default()).unwrap();
    let b = editor.add_item(section, LineItemDraft::default()).unwrap();
    assert_eq!((a, b), (max + 1, max + 2));

    editor.remove_items(section.into(), ids(&[a, 1]));
    let c = editor.add_item(section, LineItemDraft::default()).unwrap();
    assert_eq!(c, max + 3);

    let all = editor.snapshot().access_control.items.ids();
    let unique: BTreeSet<u32> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
}

// ============================================================================
// Updates and validation
// ============================================================================

#[test]
fn test_update_recomputes_totals() {
    let mut editor = memory_editor();
    editor
        .update_item(
            SectionRef::AccessControl,
            1,
            LineItemPatch {
                quantity: Some(0.0),
                ..LineItemPatch::default()
            },
        )
        .unwrap();

    let snapshot = editor.snapshot();
    let item = snapshot.access_control.items.get(1).unwrap();
    assert_eq!(item.total(), 0.0);

    let totals = editor.section_totals(SectionRef::AccessControl);
    let expected: f64 = snapshot.access_control.items.iter().map(|i| i.total()).sum();
    assert_eq!(totals.subtotal, (expected * 100.0).round() / 100.0);
}

#[test]
fn test_negative_price_is_rejected_without_change() {
    let mut editor = memory_editor();
    let before = editor.snapshot();
    let err = editor
        .update_item(
            SectionRef::Quotation,
            1,
            LineItemPatch {
                unit_price: Some(-5.0),
                ..LineItemPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ValidationError::Negative { .. }));
    assert_eq!(*editor.snapshot(), *before);
    assert!(!editor.is_dirty());
}

#[test]
fn test_overflowing_line_total_is_rejected() {
    let mut editor = memory_editor();
    editor
        .update_item(
            SectionRef::Quotation,
            1,
            LineItemPatch {
                quantity: Some(1e200),
                ..LineItemPatch::default()
            },
        )
        .unwrap();
    let before = editor.snapshot();

    let err = editor
        .update_item(
            SectionRef::Quotation,
            1,
            LineItemPatch {
                unit_price: Some(1e200),
                ..LineItemPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err, ValidationError::Overflow { field: "total" });
    assert_eq!(*editor.snapshot(), *before);
    assert!(editor.section_totals(SectionRef::Quotation).total.is_finite());

    let draft = LineItemDraft {
        quantity: 1e200,
        unit_price: 1e200,
        ..LineItemDraft::default()
    };
    assert!(editor.add_item(SectionRef::Quotation, draft).is_err());
}

#[test]
fn test_update_unknown_id_is_an_error() {
    let mut editor = memory_editor();
    let err = editor
        .update_item(SectionRef::Quotation, 999, LineItemPatch::default())
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnknownItem { id: 999, .. }));
}

#[test]
fn test_tax_rate_out_of_range() {
    let mut editor = memory_editor();
    let result = editor.dispatch(Command::SetTaxRate {
        section: SectionRef::Quotation,
        rate: 1.5,
    });
    assert!(matches!(result, Err(ValidationError::RateOutOfRange { .. })));

    let outcome = editor
        .dispatch(Command::SetTaxRate {
            section: SectionRef::Quotation,
            rate: 0.12,
        })
        .unwrap();
    assert_eq!(outcome, CommandOutcome::TaxRateSet);
    assert_eq!(editor.snapshot().quotation.tax_rate, 0.12);
}

#[test]
fn test_infrastructure_is_not_taxable() {
    let mut editor = memory_editor();
    let result = editor.dispatch(Command::SetTaxRate {
        section: SectionRef::Infrastructure,
        rate: 0.15,
    });
    assert!(matches!(result, Err(ValidationError::NotTaxable { .. })));
}

#[test]
fn test_earlier_snapshot_is_unaffected_by_edits() {
    let mut editor = memory_editor();
    let captured = editor.snapshot();
    editor
        .dispatch(Command::AddLineItem {
            section: SectionRef::Quotation,
            draft: LineItemDraft::default(),
        })
        .unwrap();
    assert_eq!(captured.quotation.items.len() + 1, editor.snapshot().quotation.items.len());
}

// ============================================================================
// Cell edits
// ============================================================================

#[test]
fn test_cell_edit_parses_currency_text() {
    let mut editor = memory_editor();
    editor
        .apply_cell_edit(cell(CollectionRef::Quotation, 2, "precioUnitario", "$1,389.00"))
        .unwrap();
    assert_eq!(editor.snapshot().quotation.items.get(2).unwrap().unit_price, 1389.0);
}

#[test]
fn test_cell_edit_follows_configured_currency() {
    let config = EditorConfig {
        currency: CurrencyFormat {
            symbol: "€".into(),
            decimals: 2,
            thousands_separator: '.',
            decimal_separator: ',',
        },
        ..EditorConfig::default()
    };
    let mut editor = ProposalEditor::open(MemoryStorage::new(), config);

    editor
        .apply_cell_edit(cell(CollectionRef::Quotation, 2, "precioUnitario", "1.234,50"))
        .unwrap();
    assert_eq!(editor.snapshot().quotation.items.get(2).unwrap().unit_price, 1234.5);

    let shown = editor.config().currency.format(99.9);
    editor
        .apply_cell_edit(cell(CollectionRef::Roi, 1, "ahorroAnual", &shown))
        .unwrap();
    assert_eq!(editor.snapshot().roi.get(1).unwrap().annual_saving, 99.9);
}

#[test]
fn test_cell_edit_total_is_read_only() {
    let mut editor = memory_editor();
    let err = editor
        .apply_cell_edit(cell(CollectionRef::Quotation, 1, "total", "10"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::ReadOnlyField { .. }));
}

#[test]
fn test_cell_edit_rejects_text_in_number_column() {
    let mut editor = memory_editor();
    let err = editor
        .apply_cell_edit(cell(CollectionRef::Roi, 1, "ahorroAnual", "mucho"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::NotANumber { .. }));
}

#[test]
fn test_cell_edit_unknown_field() {
    let mut editor = memory_editor();
    let err = editor
        .apply_cell_edit(cell(CollectionRef::Benefits, 1, "color", "rojo"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnknownField { .. }));
}

// ============================================================================
// Save, dirty flag and reset
// ============================================================================

#[test]
fn test_mutation_autosaves_and_marks_dirty() {
    let mut editor = memory_editor();
    assert!(!editor.is_dirty());

    editor
        .dispatch(Command::SetTaxRate {
            section: SectionRef::AccessControl,
            rate: 0.0,
        })
        .unwrap();
    assert!(editor.is_dirty());

    let stored = editor
        .persistence()
        .storage()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("autosaved");
    assert!(stored.contains("controlAcceso"));
}

#[test]
fn test_save_clears_dirty_and_records_time() {
    let mut editor = memory_editor();
    editor.remove_items(CollectionRef::Benefits, ids(&[1]));
    let now = chrono::Utc::now();
    assert!(editor.save(now));
    assert!(!editor.is_dirty());
    assert_eq!(editor.last_saved(), Some(now));
}

#[test]
fn test_reset_restores_default_and_clears_storage() {
    let mut editor = memory_editor();
    editor.remove_items(CollectionRef::Locations, ids(&[1, 2]));
    let snapshot = editor.reset();

    assert_eq!(*snapshot, default_snapshot());
    assert!(!editor.is_dirty());
    assert!(editor
        .persistence()
        .storage()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .is_none());
}

#[test]
fn test_import_replaces_snapshot() {
    let mut source = memory_editor();
    source.remove_items(CollectionRef::Roi, ids(&[1]));
    let export = source.export_snapshot(date()).unwrap();

    let mut target = memory_editor();
    target.import_snapshot(&export.contents).unwrap();
    assert_eq!(*target.snapshot(), *source.snapshot());
    assert!(target.is_dirty());
}

#[test]
fn test_import_of_garbage_keeps_current_state() {
    let mut editor = memory_editor();
    let before = editor.snapshot();
    assert!(editor.import_snapshot("[1, 2").is_err());
    assert_eq!(*editor.snapshot(), *before);
}

// ============================================================================
// Generation guard
// ============================================================================

#[test]
fn test_second_generation_is_rejected_while_running() {
    let mut editor = memory_editor();
    let _snapshot = editor.begin_generation().unwrap();
    assert!(editor.is_generating());
    assert!(matches!(
        editor.begin_generation(),
        Err(GenerationError::AlreadyRunning)
    ));
    editor.finish_generation();
    assert!(!editor.is_generating());
}

#[test]
fn test_guard_is_released_after_failure() {
    let mut editor = memory_editor();
    let result: Result<(), _> = editor.generate(|_| Err(GenerationError::Pdf("boom".into())));
    assert!(result.is_err());
    assert!(!editor.is_generating());

    let items = editor.generate(|s| Ok(s.quotation.items.len())).unwrap();
    assert_eq!(items, editor.snapshot().quotation.items.len());
}
