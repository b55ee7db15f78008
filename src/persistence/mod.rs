//! Load-or-default, write-through autosave, checkpoints and export.
//!
//! Storage failures never reach the editing path: [`PersistenceAdapter::load`]
//! always yields a valid snapshot and [`PersistenceAdapter::autosave`] only
//! logs. The in-memory snapshot stays authoritative.

mod defaults;
pub mod reconcile;
mod storage;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use defaults::{default_snapshot, default_value};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{FileStorage, MemoryStorage, StorageBackend};

use crate::error::PersistenceError;
use crate::types::ProposalSnapshot;

/// A snapshot serialized for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotExport {
    /// `propuesta_cctv_YYYY-MM-DD.json`
    pub file_name: String,
    /// Pretty-printed JSON.
    pub contents: String,
}

/// Parse, reconcile and validate a stored snapshot.
pub fn load_from_str(json: &str) -> Result<ProposalSnapshot, PersistenceError> {
    let stored: serde_json::Value = serde_json::from_str(json)?;
    let merged = reconcile::reconcile(default_value(), &stored);
    let snapshot: ProposalSnapshot = serde_json::from_value(merged)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Serialize a snapshot for offline backup. Round-trips through
/// [`load_from_str`].
pub fn export_snapshot(
    snapshot: &ProposalSnapshot,
    date: NaiveDate,
) -> Result<SnapshotExport, PersistenceError> {
    Ok(SnapshotExport {
        file_name: format!("propuesta_cctv_{}.json", date.format("%Y-%m-%d")),
        contents: serde_json::to_string_pretty(snapshot)?,
    })
}

/// Persists snapshots under one storage key.
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
    dirty: bool,
    last_saved: Option<DateTime<Utc>>,
}

impl<S: StorageBackend> PersistenceAdapter<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
            last_saved: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The stored snapshot, or `None` when nothing is stored.
    pub fn try_load(&self) -> Result<Option<ProposalSnapshot>, PersistenceError> {
        match self.storage.get(&self.key)? {
            Some(json) => load_from_str(&json).map(Some),
            None => Ok(None),
        }
    }

    /// The stored snapshot merged against the default, or the default itself
    /// when nothing usable is stored.
    pub fn load(&self) -> ProposalSnapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                tracing::info!(key = %self.key, "loaded stored proposal");
                snapshot
            }
            Ok(None) => {
                tracing::info!(key = %self.key, "no stored proposal, using default");
                default_snapshot()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, "stored proposal unusable, using default: {e}");
                default_snapshot()
            }
        }
    }

    fn write(&mut self, snapshot: &ProposalSnapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(snapshot)?;
        self.storage.set(&self.key, &json)
    }

    /// Write-through after a mutation. Marks the state dirty; failures are
    /// logged and swallowed.
    pub fn autosave(&mut self, snapshot: &ProposalSnapshot) {
        self.dirty = true;
        if let Err(e) = self.write(snapshot) {
            tracing::warn!(key = %self.key, "autosave failed, keeping in-memory state: {e}");
        }
    }

    /// Explicit save. On success clears the dirty flag and records `now`.
    pub fn checkpoint(&mut self, snapshot: &ProposalSnapshot, now: DateTime<Utc>) -> bool {
        match self.write(snapshot) {
            Ok(()) => {
                self.dirty = false;
                self.last_saved = Some(now);
                tracing::info!(key = %self.key, "proposal saved");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, "save failed: {e}");
                false
            }
        }
    }

    /// Clear persisted state and return the canonical default.
    pub fn reset(&mut self) -> ProposalSnapshot {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, "could not clear stored proposal: {e}");
        }
        self.dirty = false;
        default_snapshot()
    }

    /// Whether there are mutations since the last checkpoint.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }
}
