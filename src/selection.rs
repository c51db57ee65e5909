use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

use crate::config::SelectionConfig;
use crate::scoring::ViralityScorer;
use crate::store::ContentStore;
use crate::{ContentFamily, ContentItem, EngineError, RunMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Explicit(String),
    Auto,
}

impl Selection {
    pub fn from_item_id(item_id: Option<String>) -> Self {
        match item_id {
            Some(id) if !id.trim().is_empty() => Selection::Explicit(id.trim().to_string()),
            _ => Selection::Auto,
        }
    }

    pub fn mode(&self) -> RunMode {
        match self {
            Selection::Explicit(_) => RunMode::Explicit,
            Selection::Auto => RunMode::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectedItem {
    pub family: ContentFamily,
    pub item: ContentItem,
    /// Score from the rule table, before family weighting.
    pub raw_score: f64,
    /// Score that drives the lifetime target.
    pub score: f64,
}

/// Decides which items a run touches.
#[derive(Debug, Clone)]
pub struct SelectionPolicy<'a> {
    scorer: &'a ViralityScorer,
    config: &'a SelectionConfig,
}

impl<'a> SelectionPolicy<'a> {
    pub fn new(scorer: &'a ViralityScorer, config: &'a SelectionConfig) -> Self {
        Self { scorer, config }
    }

    pub async fn select<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        selection: &Selection,
        items_per_run: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<SelectedItem>, EngineError> {
        match selection {
            Selection::Explicit(id) => {
                let (family, item) = store
                    .find_item(id)
                    .await?
                    .ok_or_else(|| EngineError::ItemNotFound(id.clone()))?;
                Ok(vec![self.score_item(family, item)])
            }
            Selection::Auto => {
                let since = now - Duration::days(self.config.lookback_days);
                let articles = store
                    .recent_items(ContentFamily::Article, since, self.config.article_scan_limit)
                    .await?;
                let images = store
                    .recent_items(ContentFamily::Image, since, self.config.image_limit)
                    .await?;

                let mut selected = self.rank_articles(articles, items_per_run);
                selected.extend(
                    images
                        .into_iter()
                        .map(|item| self.score_item(ContentFamily::Image, item)),
                );
                Ok(selected)
            }
        }
    }

    /// Top `limit` articles by descending score. Ties keep the store order.
    pub fn rank_articles(&self, articles: Vec<ContentItem>, limit: usize) -> Vec<SelectedItem> {
        let mut scored: Vec<SelectedItem> = articles
            .into_iter()
            .map(|item| self.score_item(ContentFamily::Article, item))
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    pub fn score_item(&self, family: ContentFamily, item: ContentItem) -> SelectedItem {
        let raw_score = self.scorer.score(&item.scoring_input(family));
        let score = match family {
            ContentFamily::Article => raw_score,
            ContentFamily::Image => raw_score * self.config.image_weight,
        };
        SelectedItem {
            family,
            item,
            raw_score,
            score,
        }
    }
}
