pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod scoring;
pub mod selection;
pub mod simulation;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::simulation::{Phase, PhaseDurations};

pub use engine::{EngagementEngine, RunRequest};
pub use error::{EngineError, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    Article,
    Image,
}

impl ContentFamily {
    pub fn label(self) -> &'static str {
        match self {
            ContentFamily::Article => "article",
            ContentFamily::Image => "image",
        }
    }
}

/// A published article or generated image, as seen by the engine.
///
/// `anchor_at` is the publication time for articles and the creation time for
/// images; all elapsed-time math is measured from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "publishedAt", alias = "createdAt")]
    pub anchor_at: DateTime<Utc>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
    #[serde(default)]
    pub simulation_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub simulation_completed: bool,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, anchor_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            anchor_at,
            title: String::new(),
            description: String::new(),
            body: String::new(),
            category: None,
            themes: Vec::new(),
            keywords: Vec::new(),
            likes: 0,
            dislikes: 0,
            simulation_started_at: None,
            simulation_completed: false,
        }
    }

    pub fn hours_since_anchor(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.anchor_at, now)
    }

    /// Images are scored from their title and inherited tags only.
    pub fn scoring_input(&self, family: ContentFamily) -> ScoringInput<'_> {
        let (description, body, category) = match family {
            ContentFamily::Article => (
                self.description.as_str(),
                self.body.as_str(),
                self.category.as_deref(),
            ),
            ContentFamily::Image => ("", "", None),
        };
        ScoringInput {
            title: &self.title,
            description,
            body,
            category,
            themes: &self.themes,
            keywords: &self.keywords,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub category: Option<&'a str>,
    pub themes: &'a [String],
    pub keywords: &'a [String],
}

impl ScoringInput<'_> {
    pub fn text(&self) -> String {
        [self.title, self.description, self.body]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Process-wide tuning record. Owned by the store; the engine only writes
/// `last_run_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    pub delay_hours: f64,
    pub growth_hours: f64,
    pub decay_hours: f64,
    pub min_interactions: u64,
    pub max_interactions: u64,
    pub dislike_ratio: f64,
    pub items_per_run: usize,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            delay_hours: 1.5,
            growth_hours: 24.0,
            decay_hours: 48.0,
            min_interactions: 50,
            max_interactions: 300,
            dislike_ratio: 0.15,
            items_per_run: 10,
            last_run_at: None,
        }
    }
}

impl SimulationSettings {
    pub fn phases(&self) -> PhaseDurations {
        PhaseDurations::new(self.delay_hours, self.growth_hours, self.decay_hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("delayHours", self.delay_hours),
            ("growthHours", self.growth_hours),
            ("decayHours", self.decay_hours),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }
        if self.min_interactions > self.max_interactions {
            return Err(format!(
                "minInteractions ({}) exceeds maxInteractions ({})",
                self.min_interactions, self.max_interactions
            ));
        }
        if !(0.0..=1.0).contains(&self.dislike_ratio) {
            return Err(format!(
                "dislikeRatio must be within [0, 1], got {}",
                self.dislike_ratio
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Explicit,
    Auto,
}

impl RunMode {
    pub fn label(self) -> &'static str {
        match self {
            RunMode::Explicit => "explicit",
            RunMode::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Counters were incremented.
    Updated,
    /// Nothing drawn this window and the item is still live.
    NoChange,
    /// Nothing drawn, but the lifetime ran out and the item was closed.
    Completed,
    AlreadyCompleted,
    /// Computed but not written.
    DryRun,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub id: String,
    pub family: ContentFamily,
    pub score: f64,
    pub phase: Phase,
    pub hours_since_anchor: f64,
    pub intensity: f64,
    pub lifetime_target: u64,
    pub lambda: f64,
    pub likes: u64,
    pub dislikes: u64,
    pub status: ItemStatus,
    pub completed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub manual: bool,
    pub dry_run: bool,
    pub window_hours: f64,
    pub candidates: usize,
    pub processed: usize,
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn new(mode: RunMode, manual: bool, dry_run: bool, window_hours: f64) -> Self {
        Self {
            mode,
            manual,
            dry_run,
            window_hours,
            candidates: 0,
            processed: 0,
            skipped: 0,
            completed: 0,
            failed: 0,
            items: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome.status {
            ItemStatus::Updated => self.processed += 1,
            ItemStatus::Failed => self.failed += 1,
            ItemStatus::NoChange
            | ItemStatus::Completed
            | ItemStatus::AlreadyCompleted
            | ItemStatus::DryRun => self.skipped += 1,
        }
        if outcome.completed && outcome.status != ItemStatus::AlreadyCompleted {
            self.completed += 1;
        }
        self.items.push(outcome);
    }
}

pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
