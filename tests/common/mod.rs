//! Common test utilities.
//!
//! Builders for line items and snapshots, plus helpers that edit the default
//! proposal JSON to simulate older or damaged stored blobs.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use chrono::NaiveDate;
use serde_json::Value;

use propview::persistence::{default_value, MemoryStorage};
use propview::{Collection, EditorConfig, LineItem, ProposalEditor};

// ============================================================================
// Builders
// ============================================================================

/// A line item with only the priced fields set.
#[must_use]
pub fn item(id: u32, quantity: f64, unit_price: f64) -> LineItem {
    LineItem {
        id,
        category: "CCTV".into(),
        name: format!("Item {id}"),
        description: String::new(),
        quantity,
        unit_price,
        icon: String::new(),
    }
}

/// Collection with ids 1..=n from `(quantity, unit_price)` pairs.
#[must_use]
pub fn collection(pairs: &[(f64, f64)]) -> Collection<LineItem> {
    (1u32..)
        .zip(pairs)
        .map(|(id, &(q, p))| item(id, q, p))
        .collect()
}

/// Editor over fresh in-memory storage with the default config.
#[must_use]
pub fn memory_editor() -> ProposalEditor<MemoryStorage> {
    ProposalEditor::open(MemoryStorage::new(), EditorConfig::default())
}

#[must_use]
pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date")
}

// ============================================================================
// Stored-blob helpers
// ============================================================================

/// The default proposal JSON with the object at `path` edited by `edit`.
#[must_use]
pub fn edited_default(
    path: &[&str],
    edit: impl FnOnce(&mut serde_json::Map<String, Value>),
) -> String {
    let mut value = default_value().clone();
    let mut cursor = &mut value;
    for key in path {
        cursor = cursor.get_mut(*key).expect("path exists in default");
    }
    edit(cursor.as_object_mut().expect("path is an object"));
    serde_json::to_string(&value).expect("serialize")
}

/// The default proposal JSON without `key` under `path`.
#[must_use]
pub fn default_without(path: &[&str], key: &str) -> String {
    edited_default(path, |object| {
        object.remove(key);
    })
}
