pub mod json;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{ContentFamily, ContentItem, SimulationSettings, StoreError};

pub use json::{JsonStore, StoreSnapshot};

/// Counter deltas for one item, applied atomically by the store.
#[derive(Debug, Clone, Copy)]
pub struct EngagementUpdate {
    pub likes: u64,
    pub dislikes: u64,
    pub now: DateTime<Utc>,
    /// Hours after the anchor past which the item is closed.
    pub lifetime_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { completed: bool },
    AlreadyCompleted,
}

/// Persistence collaborator for the engine.
///
/// `apply_engagement` must perform the completion check, the increments and
/// the lifecycle updates as one atomic step, so overlapping runs never lose
/// or double-apply a write.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn settings(&self) -> Result<Option<SimulationSettings>, StoreError>;

    async fn record_last_run(&self, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn find_item(
        &self,
        id: &str,
    ) -> Result<Option<(ContentFamily, ContentItem)>, StoreError>;

    /// Uncompleted items anchored at or after `since`, newest first.
    async fn recent_items(
        &self,
        family: ContentFamily,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ContentItem>, StoreError>;

    async fn apply_engagement(
        &self,
        family: ContentFamily,
        id: &str,
        update: EngagementUpdate,
    ) -> Result<ApplyOutcome, StoreError>;
}
