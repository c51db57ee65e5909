use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::ledger::LedgerUpdater;
use crate::scoring::ViralityScorer;
use crate::selection::{SelectedItem, Selection, SelectionPolicy};
use crate::simulation::{PoissonSampler, WindowPlan};
use crate::store::ContentStore;
use crate::{
    hours_between, EngineError, ItemOutcome, ItemStatus, RunReport, SimulationSettings,
};

#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub item_id: Option<String>,
    pub manual: bool,
    pub dry_run: bool,
    /// Overrides the window derived from the previous run.
    pub window_hours: Option<f64>,
}

impl RunRequest {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn for_item(item_id: impl Into<String>) -> Self {
        Self {
            item_id: Some(item_id.into()),
            ..Self::default()
        }
    }
}

/// One invocation of the engine: select, score, draw, persist.
pub struct EngagementEngine<S: ContentStore + ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
    scorer: ViralityScorer,
    sampler: PoissonSampler,
}

impl<S: ContentStore + ?Sized> EngagementEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let scorer = ViralityScorer::new(config.rules.clone());
        let sampler = config.sampler.build();
        Self {
            store,
            config,
            scorer,
            sampler,
        }
    }

    pub fn store(&self) -> &S {
        self.store.as_ref()
    }

    /// Seeded from the config when a seed is set, from entropy otherwise.
    pub fn make_rng(&self) -> StdRng {
        match self.config.sampler.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub async fn run<R: Rng + ?Sized>(
        &self,
        request: &RunRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<RunReport, EngineError> {
        let settings = self.load_settings().await?;
        let window_hours = self.window_hours(request.window_hours, settings.last_run_at, now)?;
        let selection = Selection::from_item_id(request.item_id.clone());

        let policy = SelectionPolicy::new(&self.scorer, &self.config.selection);
        let selected = policy
            .select(self.store(), &selection, settings.items_per_run, now)
            .await?;

        let mut report = RunReport::new(
            selection.mode(),
            request.manual,
            request.dry_run,
            window_hours,
        );
        report.candidates = selected.len();

        let ledger = LedgerUpdater::new(self.store(), request.dry_run);
        for entry in &selected {
            let outcome = self
                .process_item(&ledger, entry, &settings, window_hours, now, rng)
                .await;
            report.record(outcome);
        }

        if !request.dry_run {
            if let Err(err) = self.store.record_last_run(now).await {
                warn!(error = %err, "failed to record last run timestamp");
            }
        }

        info!(
            mode = selection.mode().label(),
            manual = request.manual,
            dry_run = request.dry_run,
            window_hours,
            candidates = report.candidates,
            processed = report.processed,
            completed = report.completed,
            failed = report.failed,
            "engagement run finished"
        );
        Ok(report)
    }

    /// Explicit override wins; otherwise the time since the last run, clamped
    /// to the configured bounds; otherwise the default cadence.
    pub fn window_hours(
        &self,
        requested: Option<f64>,
        last_run_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<f64, EngineError> {
        let window = &self.config.window;
        if let Some(hours) = requested {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(EngineError::InvalidRequest(format!(
                    "window hours must be positive, got {}",
                    hours
                )));
            }
            return Ok(hours);
        }
        Ok(match last_run_at {
            // f64::clamp panics on NaN bounds
            Some(last) => hours_between(last, now)
                .max(window.min_hours)
                .min(window.max_hours),
            None => window.default_hours,
        })
    }

    async fn load_settings(&self) -> Result<SimulationSettings, EngineError> {
        let settings = self
            .store
            .settings()
            .await
            .map_err(EngineError::SettingsUnreadable)?
            .ok_or(EngineError::SettingsMissing)?;
        settings.validate().map_err(EngineError::SettingsInvalid)?;
        Ok(settings)
    }

    async fn process_item<R: Rng + ?Sized>(
        &self,
        ledger: &LedgerUpdater<'_, S>,
        selected: &SelectedItem,
        settings: &SimulationSettings,
        window_hours: f64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> ItemOutcome {
        let phases = settings.phases();
        let hours = selected.item.hours_since_anchor(now);
        let plan = WindowPlan::new(
            selected.score,
            hours,
            window_hours,
            &phases,
            settings.min_interactions,
            settings.max_interactions,
        );

        // Completed items never consume a draw.
        let interactions = if selected.item.simulation_completed {
            Default::default()
        } else {
            plan.draw(&self.sampler, rng, settings.dislike_ratio)
        };

        debug!(
            item = %selected.item.id,
            family = selected.family.label(),
            score = selected.score,
            raw_score = selected.raw_score,
            phase = plan.phase.label(),
            intensity = plan.intensity,
            lambda = plan.lambda,
            likes = interactions.likes,
            dislikes = interactions.dislikes,
            "window drawn"
        );

        let mut outcome = ItemOutcome {
            id: selected.item.id.clone(),
            family: selected.family,
            score: selected.score,
            phase: plan.phase,
            hours_since_anchor: hours,
            intensity: plan.intensity,
            lifetime_target: plan.lifetime_target,
            lambda: plan.lambda,
            likes: interactions.likes,
            dislikes: interactions.dislikes,
            status: ItemStatus::NoChange,
            completed: selected.item.simulation_completed,
            error: None,
        };

        match ledger
            .apply(selected, &plan, interactions, phases.lifetime(), now)
            .await
        {
            Ok(entry) => {
                outcome.status = entry.status;
                outcome.completed = entry.completed;
                if matches!(entry.status, ItemStatus::AlreadyCompleted) {
                    outcome.likes = 0;
                    outcome.dislikes = 0;
                }
            }
            Err(err) => {
                warn!(
                    item = %selected.item.id,
                    family = selected.family.label(),
                    error = %err,
                    "failed to apply engagement"
                );
                outcome.status = ItemStatus::Failed;
                outcome.error = Some(err.to_string());
            }
        }
        outcome
    }
}
