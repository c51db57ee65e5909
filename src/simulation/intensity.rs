//! Phase-based engagement intensity.
//!
//! The lifecycle is never stored: the phase an item is in is recomputed from
//! the hours elapsed since its anchor on every run.

use serde::{Deserialize, Serialize};

/// Residual rate once the decay phase has run out.
pub const LONG_TAIL_INTENSITY: f64 = 0.02;

const GROWTH_STEEPNESS: f64 = 3.0;
const DECAY_STEEPNESS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub delay: f64,
    pub growth: f64,
    pub decay: f64,
}

impl PhaseDurations {
    pub fn new(delay: f64, growth: f64, decay: f64) -> Self {
        Self {
            delay,
            growth,
            decay,
        }
    }

    /// Hours from the anchor until the long tail begins.
    pub fn lifetime(&self) -> f64 {
        self.delay + self.growth + self.decay
    }

    /// Hours over which the lifetime target is spread.
    pub fn active_span(&self) -> f64 {
        self.growth + self.decay
    }

    pub fn phase_at(&self, hours: f64) -> Phase {
        if hours < self.delay {
            Phase::Dormant
        } else if hours < self.delay + self.growth {
            Phase::Growth
        } else if hours < self.lifetime() {
            Phase::Decay
        } else {
            Phase::LongTail
        }
    }

    pub fn is_finished(&self, hours: f64) -> bool {
        hours > self.lifetime()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dormant,
    Growth,
    Decay,
    LongTail,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Dormant => "dormant",
            Phase::Growth => "growth",
            Phase::Decay => "decay",
            Phase::LongTail => "long tail",
        }
    }
}

/// Normalized intensity in `[0, 1]` at `hours` after the anchor.
pub fn intensity(hours: f64, phases: &PhaseDurations) -> f64 {
    if hours.is_nan() {
        return 0.0;
    }
    match phases.phase_at(hours) {
        Phase::Dormant => 0.0,
        Phase::Growth => {
            let progress = (hours - phases.delay) / phases.growth;
            1.0 - (-GROWTH_STEEPNESS * progress).exp()
        }
        Phase::Decay => {
            let progress = (hours - phases.delay - phases.growth) / phases.decay;
            (-DECAY_STEEPNESS * progress).exp()
        }
        Phase::LongTail => LONG_TAIL_INTENSITY,
    }
}
