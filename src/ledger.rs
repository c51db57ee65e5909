use chrono::{DateTime, Utc};

use crate::simulation::{WindowInteractions, WindowPlan};
use crate::selection::SelectedItem;
use crate::store::{ApplyOutcome, ContentStore, EngagementUpdate};
use crate::{ItemStatus, StoreError};

/// Result of pushing one item's window through the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub status: ItemStatus,
    pub completed: bool,
}

/// Writes counter deltas and lifecycle flags through a [`ContentStore`].
pub struct LedgerUpdater<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    dry_run: bool,
}

impl<'a, S: ContentStore + ?Sized> LedgerUpdater<'a, S> {
    pub fn new(store: &'a S, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    pub async fn apply(
        &self,
        selected: &SelectedItem,
        plan: &WindowPlan,
        interactions: WindowInteractions,
        lifetime_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, StoreError> {
        if selected.item.simulation_completed {
            return Ok(LedgerEntry {
                status: ItemStatus::AlreadyCompleted,
                completed: true,
            });
        }

        // Nothing drawn and still live: no write at all.
        if interactions.is_empty() && !plan.finished {
            return Ok(LedgerEntry {
                status: ItemStatus::NoChange,
                completed: false,
            });
        }

        if self.dry_run {
            return Ok(LedgerEntry {
                status: if interactions.is_empty() {
                    ItemStatus::NoChange
                } else {
                    ItemStatus::DryRun
                },
                completed: plan.finished,
            });
        }

        let update = EngagementUpdate {
            likes: interactions.likes,
            dislikes: interactions.dislikes,
            now,
            lifetime_hours,
        };
        let outcome = self
            .store
            .apply_engagement(selected.family, &selected.item.id, update)
            .await?;

        Ok(match outcome {
            ApplyOutcome::AlreadyCompleted => LedgerEntry {
                status: ItemStatus::AlreadyCompleted,
                completed: true,
            },
            ApplyOutcome::Applied { completed } if interactions.is_empty() => LedgerEntry {
                status: if completed {
                    ItemStatus::Completed
                } else {
                    ItemStatus::NoChange
                },
                completed,
            },
            ApplyOutcome::Applied { completed } => LedgerEntry {
                status: ItemStatus::Updated,
                completed,
            },
        })
    }
}
