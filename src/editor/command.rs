//! Edit commands dispatched by the presentation layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{
    BenefitDraft, BenefitPatch, CollectionRef, LineItemDraft, LineItemPatch, LocationDraft,
    LocationPatch, RoiItemDraft, RoiItemPatch, SectionRef,
};

/// One user edit, serialized as `{"command": ..., "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    AddLineItem {
        section: SectionRef,
        #[serde(default)]
        draft: LineItemDraft,
    },
    #[serde(rename_all = "camelCase")]
    UpdateLineItem {
        section: SectionRef,
        id: u32,
        patch: LineItemPatch,
    },
    AddBenefit {
        draft: BenefitDraft,
    },
    UpdateBenefit {
        id: u32,
        patch: BenefitPatch,
    },
    AddRoiItem {
        draft: RoiItemDraft,
    },
    UpdateRoiItem {
        id: u32,
        patch: RoiItemPatch,
    },
    AddLocation {
        draft: LocationDraft,
    },
    UpdateLocation {
        id: u32,
        patch: LocationPatch,
    },
    /// Remove every listed id; ids not present are ignored.
    RemoveItems {
        collection: CollectionRef,
        ids: BTreeSet<u32>,
    },
    SetTaxRate {
        section: SectionRef,
        rate: f64,
    },
}

/// What a successfully applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandOutcome {
    Added { id: u32 },
    Updated { id: u32 },
    Removed { count: usize },
    TaxRateSet,
}
