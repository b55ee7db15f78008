//! Applies commands to a copy of the snapshot.
//!
//! The input snapshot is never touched: a command either produces a whole
//! new snapshot or fails with nothing applied.

use crate::error::{ensure_rate, ValidationError};
use crate::types::{CollectionRef, ProposalSnapshot, SectionRef};

use super::command::{Command, CommandOutcome};

/// Apply `command` to a clone of `snapshot`.
pub(crate) fn apply_command(
    snapshot: &ProposalSnapshot,
    command: Command,
) -> Result<(ProposalSnapshot, CommandOutcome), ValidationError> {
    let mut next = snapshot.clone();
    let outcome = match command {
        Command::AddLineItem { section, draft } => CommandOutcome::Added {
            id: next.line_items_mut(section).add(draft)?,
        },
        Command::UpdateLineItem { section, id, patch } => {
            next.line_items_mut(section).update(id, &patch)?;
            CommandOutcome::Updated { id }
        }
        Command::AddBenefit { draft } => CommandOutcome::Added {
            id: next.benefits.add(draft)?,
        },
        Command::UpdateBenefit { id, patch } => {
            next.benefits.update(id, &patch)?;
            CommandOutcome::Updated { id }
        }
        Command::AddRoiItem { draft } => CommandOutcome::Added {
            id: next.roi.add(draft)?,
        },
        Command::UpdateRoiItem { id, patch } => {
            next.roi.update(id, &patch)?;
            CommandOutcome::Updated { id }
        }
        Command::AddLocation { draft } => CommandOutcome::Added {
            id: next.locations.add(draft)?,
        },
        Command::UpdateLocation { id, patch } => {
            next.locations.update(id, &patch)?;
            CommandOutcome::Updated { id }
        }
        Command::RemoveItems { collection, ids } => {
            let count = match collection {
                CollectionRef::Quotation => next.line_items_mut(SectionRef::Quotation).remove(&ids),
                CollectionRef::AccessControl => {
                    next.line_items_mut(SectionRef::AccessControl).remove(&ids)
                }
                CollectionRef::Infrastructure => {
                    next.line_items_mut(SectionRef::Infrastructure).remove(&ids)
                }
                CollectionRef::Benefits => next.benefits.remove(&ids),
                CollectionRef::Roi => next.roi.remove(&ids),
                CollectionRef::Locations => next.locations.remove(&ids),
            };
            CommandOutcome::Removed { count }
        }
        Command::SetTaxRate { section, rate } => {
            ensure_rate("taxRate", rate)?;
            match section {
                SectionRef::Quotation => next.quotation.tax_rate = rate,
                SectionRef::AccessControl => next.access_control.tax_rate = rate,
                SectionRef::Infrastructure => {
                    return Err(ValidationError::NotTaxable {
                        section: SectionRef::Infrastructure.title(),
                    })
                }
            }
            CommandOutcome::TaxRateSet
        }
    };
    Ok((next, outcome))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::persistence::default_snapshot;
    use crate::types::{LineItemDraft, LineItemPatch, RoiItemDraft};

    #[test]
    fn test_failed_command_leaves_input_untouched() {
        let snapshot = default_snapshot();
        let err = apply_command(
            &snapshot,
            Command::UpdateLineItem {
                section: SectionRef::Quotation,
                id: 1,
                patch: LineItemPatch {
                    quantity: Some(-2.0),
                    ..LineItemPatch::default()
                },
            },
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "quantity", .. }));
        assert_eq!(snapshot, default_snapshot());
    }

    #[test]
    fn test_add_allocates_next_id() {
        let snapshot = default_snapshot();
        let next_id = snapshot.roi.next_id().unwrap();
        let (next, outcome) = apply_command(
            &snapshot,
            Command::AddRoiItem {
                draft: RoiItemDraft {
                    concept: "Energía".into(),
                    annual_saving: 1200.0,
                    description: String::new(),
                },
            },
        )
        .unwrap();
        assert_eq!(outcome, CommandOutcome::Added { id: next_id });
        assert_eq!(next.roi.len(), snapshot.roi.len() + 1);
    }

    #[test]
    fn test_add_line_item_to_infrastructure() {
        let snapshot = default_snapshot();
        let (next, _) = apply_command(
            &snapshot,
            Command::AddLineItem {
                section: SectionRef::Infrastructure,
                draft: LineItemDraft::default(),
            },
        )
        .unwrap();
        assert_eq!(
            next.current_state.infrastructure.len(),
            snapshot.current_state.infrastructure.len() + 1
        );
    }

    #[test]
    fn test_tax_rate() {
        let snapshot = default_snapshot();
        let (next, _) = apply_command(
            &snapshot,
            Command::SetTaxRate {
                section: SectionRef::AccessControl,
                rate: 0.12,
            },
        )
        .unwrap();
        assert_eq!(next.access_control.tax_rate, 0.12);
        assert_eq!(next.quotation.tax_rate, snapshot.quotation.tax_rate);

        assert!(apply_command(
            &snapshot,
            Command::SetTaxRate {
                section: SectionRef::Quotation,
                rate: 1.2,
            },
        )
        .is_err());
        assert!(matches!(
            apply_command(
                &snapshot,
                Command::SetTaxRate {
                    section: SectionRef::Infrastructure,
                    rate: 0.1,
                },
            ),
            Err(ValidationError::NotTaxable { .. })
        ));
    }
}
