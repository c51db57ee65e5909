pub mod rules;
pub mod virality;

pub use rules::{CueRule, ScoringRules};
pub use virality::{RuleHit, ScoreBreakdown, ViralityScorer};
