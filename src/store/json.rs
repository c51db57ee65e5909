use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{ser::SerializeSeq, Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::store::{ApplyOutcome, ContentStore, EngagementUpdate};
use crate::{hours_between, ContentFamily, ContentItem, SimulationSettings, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub settings: Option<SimulationSettings>,
    #[serde(default)]
    pub articles: Vec<ContentItem>,
    /// Written with `createdAt` as the anchor field, the name images use.
    #[serde(default, serialize_with = "serialize_images")]
    pub images: Vec<ContentItem>,
}

impl StoreSnapshot {
    fn items(&self, family: ContentFamily) -> &[ContentItem] {
        match family {
            ContentFamily::Article => &self.articles,
            ContentFamily::Image => &self.images,
        }
    }

    fn items_mut(&mut self, family: ContentFamily) -> &mut Vec<ContentItem> {
        match family {
            ContentFamily::Article => &mut self.articles,
            ContentFamily::Image => &mut self.images,
        }
    }
}

/// Single-file JSON store. Every mutation happens under one write lock and is
/// flushed before the lock is released.
pub struct JsonStore {
    path: Option<PathBuf>,
    data: RwLock<StoreSnapshot>,
}

impl JsonStore {
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let raw = tokio::fs::read_to_string(&path).await?;
            if raw.trim().is_empty() {
                StoreSnapshot::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            StoreSnapshot::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(snapshot: StoreSnapshot) -> Self {
        Self {
            path: None,
            data: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.data.read().await.clone()
    }

    pub async fn put_settings(&self, settings: SimulationSettings) -> Result<(), StoreError> {
        let mut guard = self.data.write().await;
        guard.settings = Some(settings);
        self.persist(&guard).await
    }

    pub async fn upsert_item(
        &self,
        family: ContentFamily,
        item: ContentItem,
    ) -> Result<(), StoreError> {
        let mut guard = self.data.write().await;
        let items = guard.items_mut(family);
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        self.persist(&guard).await
    }

    async fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(snapshot)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for JsonStore {
    async fn settings(&self) -> Result<Option<SimulationSettings>, StoreError> {
        Ok(self.data.read().await.settings.clone())
    }

    async fn record_last_run(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut guard = self.data.write().await;
        let settings = guard
            .settings
            .as_mut()
            .ok_or_else(|| StoreError::NotFound("settings".to_string()))?;
        settings.last_run_at = Some(at);
        self.persist(&guard).await
    }

    async fn find_item(
        &self,
        id: &str,
    ) -> Result<Option<(ContentFamily, ContentItem)>, StoreError> {
        let guard = self.data.read().await;
        for family in [ContentFamily::Article, ContentFamily::Image] {
            if let Some(item) = guard.items(family).iter().find(|item| item.id == id) {
                return Ok(Some((family, item.clone())));
            }
        }
        Ok(None)
    }

    async fn recent_items(
        &self,
        family: ContentFamily,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let guard = self.data.read().await;
        let mut items: Vec<ContentItem> = guard
            .items(family)
            .iter()
            .filter(|item| !item.simulation_completed && item.anchor_at >= since)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.anchor_at.cmp(&a.anchor_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn apply_engagement(
        &self,
        family: ContentFamily,
        id: &str,
        update: EngagementUpdate,
    ) -> Result<ApplyOutcome, StoreError> {
        let mut guard = self.data.write().await;
        let item = guard
            .items_mut(family)
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if item.simulation_completed {
            return Ok(ApplyOutcome::AlreadyCompleted);
        }

        let previous = item.clone();
        if update.likes > 0 || update.dislikes > 0 {
            item.likes = item.likes.saturating_add(update.likes);
            item.dislikes = item.dislikes.saturating_add(update.dislikes);
            if item.simulation_started_at.is_none() {
                item.simulation_started_at = Some(update.now);
            }
        }

        let completed = hours_between(item.anchor_at, update.now) > update.lifetime_hours;
        if completed {
            item.simulation_completed = true;
        }

        let persisted = self.persist(&guard).await;
        if let Err(err) = persisted {
            // keep memory consistent with what is on disk
            if let Some(item) = guard.items_mut(family).iter_mut().find(|item| item.id == id) {
                *item = previous;
            }
            return Err(err);
        }
        Ok(ApplyOutcome::Applied { completed })
    }
}

fn serialize_images<S>(items: &[ContentItem], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        let mut value =
            serde_json::to_value(item).map_err(<S::Error as serde::ser::Error>::custom)?;
        if let Some(fields) = value.as_object_mut() {
            if let Some(anchor) = fields.remove("publishedAt") {
                fields.insert("createdAt".to_string(), anchor);
            }
        }
        seq.serialize_element(&value)?;
    }
    seq.end()
}

async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
