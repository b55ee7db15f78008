//! Proposal state container.
//!
//! `ProposalEditor` owns the current snapshot and is the only way to change
//! it. Every accepted command:
//! - is applied to a copy of the snapshot (see [`mutation`]),
//! - publishes the copy as the new immutable `Arc<ProposalSnapshot>`,
//! - is written through to storage.
//!
//! A removal that matches no id changes nothing and writes nothing.
//!
//! Readers holding an earlier `Arc` keep seeing the state they captured,
//! which is what document generation relies on.

mod command;
mod input;
pub(crate) mod mutation;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

pub use command::{Command, CommandOutcome};
pub use input::CellEdit;

use crate::config::EditorConfig;
use crate::error::{GenerationError, PersistenceError, ValidationError};
use crate::finance;
use crate::persistence::{self, PersistenceAdapter, SnapshotExport, StorageBackend};
use crate::types::{
    CollectionRef, DerivedMetrics, LineItemDraft, LineItemPatch, ProposalSnapshot, SectionRef,
    SectionTotals,
};

/// The editor: current snapshot, persistence and the generation guard.
#[derive(Debug)]
pub struct ProposalEditor<S> {
    snapshot: Arc<ProposalSnapshot>,
    persistence: PersistenceAdapter<S>,
    config: EditorConfig,
    generating: bool,
}

impl<S: StorageBackend> ProposalEditor<S> {
    /// Load the stored proposal (or the default) from `storage`.
    pub fn open(storage: S, config: EditorConfig) -> Self {
        let persistence = PersistenceAdapter::new(storage, config.storage_key.clone());
        let snapshot = Arc::new(persistence.load());
        Self {
            snapshot,
            persistence,
            config,
            generating: false,
        }
    }

    /// The current snapshot. Cheap; later edits do not affect it.
    pub fn snapshot(&self) -> Arc<ProposalSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Validate and apply one command, then autosave.
    ///
    /// On error the snapshot is unchanged and nothing is written.
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, ValidationError> {
        let (next, outcome) = mutation::apply_command(&self.snapshot, command)?;
        self.publish(next, &outcome);
        Ok(outcome)
    }

    /// Make `next` the current snapshot and write it through. A removal
    /// that matched nothing leaves the current snapshot in place.
    fn publish(&mut self, next: ProposalSnapshot, outcome: &CommandOutcome) {
        if *outcome == (CommandOutcome::Removed { count: 0 }) {
            tracing::debug!("nothing to remove");
            return;
        }
        tracing::debug!(?outcome, "command applied");
        self.snapshot = Arc::new(next);
        self.persistence.autosave(&self.snapshot);
    }

    /// Apply a grid cell edit.
    pub fn apply_cell_edit(&mut self, edit: CellEdit) -> Result<CommandOutcome, ValidationError> {
        let command = edit.into_command(&self.config.currency)?;
        self.dispatch(command)
    }

    /// Append a line item; returns its id.
    pub fn add_item(
        &mut self,
        section: SectionRef,
        draft: LineItemDraft,
    ) -> Result<u32, ValidationError> {
        let mut next = ProposalSnapshot::clone(&self.snapshot);
        let id = next.line_items_mut(section).add(draft)?;
        self.publish(next, &CommandOutcome::Added { id });
        Ok(id)
    }

    pub fn update_item(
        &mut self,
        section: SectionRef,
        id: u32,
        patch: LineItemPatch,
    ) -> Result<(), ValidationError> {
        self.dispatch(Command::UpdateLineItem { section, id, patch })
            .map(|_| ())
    }

    /// Remove the listed ids; returns how many were present.
    pub fn remove_items(&mut self, collection: CollectionRef, ids: BTreeSet<u32>) -> usize {
        match self.dispatch(Command::RemoveItems { collection, ids }) {
            Ok(CommandOutcome::Removed { count }) => count,
            _ => 0,
        }
    }

    /// Totals of one section of the current snapshot.
    pub fn section_totals(&self, section: SectionRef) -> SectionTotals {
        finance::compute_totals(
            self.snapshot.line_items(section),
            self.snapshot.tax_rate(section),
        )
    }

    /// All derived metrics of the current snapshot.
    pub fn metrics(&self) -> Result<DerivedMetrics, ValidationError> {
        finance::derive_metrics(&self.snapshot, &self.config.roi)
    }

    /// Explicit save. Returns whether it succeeded.
    pub fn save(&mut self, now: DateTime<Utc>) -> bool {
        self.persistence.checkpoint(&self.snapshot, now)
    }

    pub fn is_dirty(&self) -> bool {
        self.persistence.is_dirty()
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.persistence.last_saved()
    }

    /// Discard all edits and stored state.
    pub fn reset(&mut self) -> Arc<ProposalSnapshot> {
        self.snapshot = Arc::new(self.persistence.reset());
        tracing::info!("proposal reset to default");
        self.snapshot()
    }

    /// Serialize the current snapshot for download.
    pub fn export_snapshot(&self, date: NaiveDate) -> Result<SnapshotExport, PersistenceError> {
        persistence::export_snapshot(&self.snapshot, date)
    }

    /// Replace the current snapshot with an exported one and autosave it.
    pub fn import_snapshot(&mut self, json: &str) -> Result<(), PersistenceError> {
        let snapshot = persistence::load_from_str(json)?;
        self.snapshot = Arc::new(snapshot);
        self.persistence.autosave(&self.snapshot);
        Ok(())
    }

    /// Whether a document is being generated.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Start a document generation and capture the snapshot to project.
    ///
    /// Fails while another generation is in flight. Every successful call
    /// must be paired with [`finish_generation`](Self::finish_generation).
    pub fn begin_generation(&mut self) -> Result<Arc<ProposalSnapshot>, GenerationError> {
        if self.generating {
            return Err(GenerationError::AlreadyRunning);
        }
        self.generating = true;
        tracing::info!("document generation started");
        Ok(self.snapshot())
    }

    /// Release the generation guard, whether generation succeeded or not.
    pub fn finish_generation(&mut self) {
        self.generating = false;
        tracing::info!("document generation finished");
    }

    /// Run `generate` against a captured snapshot under the guard.
    pub fn generate<T>(
        &mut self,
        generate: impl FnOnce(&ProposalSnapshot) -> Result<T, GenerationError>,
    ) -> Result<T, GenerationError> {
        let snapshot = self.begin_generation()?;
        let result = generate(&snapshot);
        self.finish_generation();
        if let Err(ref e) = result {
            tracing::warn!("document generation failed: {e}");
        }
        result
    }
}
