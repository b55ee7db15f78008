//! The canonical default dataset bundled into the binary.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::types::{
    Characteristics, Collection, CurrentState, PricedSection, ProposalSnapshot,
};

const DEFAULT_PROPOSAL_JSON: &str = include_str!("../../data/default_proposal.json");

static DEFAULT_VALUE: OnceLock<Value> = OnceLock::new();
static DEFAULT_SNAPSHOT: OnceLock<ProposalSnapshot> = OnceLock::new();

/// The default dataset as a JSON tree; the reference schema for
/// reconciliation.
pub fn default_value() -> &'static Value {
    DEFAULT_VALUE.get_or_init(|| {
        serde_json::from_str(DEFAULT_PROPOSAL_JSON).unwrap_or_else(|e| {
            tracing::error!("bundled default proposal is not valid JSON: {e}");
            Value::Null
        })
    })
}

/// The canonical default snapshot.
pub fn default_snapshot() -> ProposalSnapshot {
    DEFAULT_SNAPSHOT
        .get_or_init(|| {
            let parsed = serde_json::from_value::<ProposalSnapshot>(default_value().clone())
                .map_err(|e| e.to_string())
                .and_then(|snapshot| {
                    snapshot.validate().map_err(|e| e.to_string())?;
                    Ok(snapshot)
                });
            parsed.unwrap_or_else(|reason| {
                tracing::error!("bundled default proposal is unusable: {reason}");
                empty_snapshot()
            })
        })
        .clone()
}

fn empty_section() -> PricedSection {
    PricedSection {
        items: Collection::default(),
        notes: Vec::new(),
        tax_rate: 0.0,
        category_colors: BTreeMap::new(),
        kit_breakdown: Vec::new(),
    }
}

fn empty_snapshot() -> ProposalSnapshot {
    ProposalSnapshot {
        current_state: CurrentState {
            infrastructure: Collection::default(),
            characteristics: Characteristics {
                resolution: String::new(),
                recording_days: 0,
            },
        },
        quotation: empty_section(),
        access_control: empty_section(),
        locations: Collection::default(),
        benefits: Collection::default(),
        roi: Collection::default(),
    }
}
