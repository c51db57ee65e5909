use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::{intensity, lifetime_target, Phase, PhaseDurations, PoissonSampler};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInteractions {
    pub likes: u64,
    pub dislikes: u64,
}

impl WindowInteractions {
    pub fn total(&self) -> u64 {
        self.likes + self.dislikes
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Everything the engine knows about one item before it draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPlan {
    pub hours_since_anchor: f64,
    pub phase: Phase,
    pub intensity: f64,
    pub lifetime_target: u64,
    pub lambda: f64,
    pub finished: bool,
}

impl WindowPlan {
    pub fn new(
        score: f64,
        hours_since_anchor: f64,
        window_hours: f64,
        phases: &PhaseDurations,
        min_interactions: u64,
        max_interactions: u64,
    ) -> Self {
        let current = intensity(hours_since_anchor, phases);
        let target = lifetime_target(score, min_interactions, max_interactions);
        Self {
            hours_since_anchor,
            phase: phases.phase_at(hours_since_anchor),
            intensity: current,
            lifetime_target: target,
            lambda: expected_rate(current, window_hours, target, phases),
            finished: phases.is_finished(hours_since_anchor),
        }
    }

    pub fn draw<R: Rng + ?Sized>(
        &self,
        sampler: &PoissonSampler,
        rng: &mut R,
        dislike_ratio: f64,
    ) -> WindowInteractions {
        split_interactions(sampler.sample(rng, self.lambda), dislike_ratio)
    }
}

/// Expected interactions for one window: `I * W * target / (growth + decay)`.
pub fn expected_rate(
    intensity: f64,
    window_hours: f64,
    lifetime_target: u64,
    phases: &PhaseDurations,
) -> f64 {
    let span = phases.active_span();
    if span <= 0.0 || window_hours <= 0.0 {
        return 0.0;
    }
    let rate = intensity * window_hours * lifetime_target as f64 / span;
    if rate.is_finite() {
        rate.max(0.0)
    } else {
        0.0
    }
}

pub fn split_interactions(total: u64, dislike_ratio: f64) -> WindowInteractions {
    let ratio = if dislike_ratio.is_nan() {
        0.0
    } else {
        dislike_ratio.clamp(0.0, 1.0)
    };
    let dislikes = ((total as f64 * ratio).round() as u64).min(total);
    WindowInteractions {
        likes: total - dislikes,
        dislikes,
    }
}
