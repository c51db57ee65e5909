pub mod intensity;
pub mod poisson;
pub mod volume;
pub mod window;

pub use intensity::{intensity, Phase, PhaseDurations, LONG_TAIL_INTENSITY};
pub use poisson::{LargeRateMethod, PoissonSampler};
pub use volume::{lifetime_target, score_multiplier};
pub use window::{expected_rate, split_interactions, WindowInteractions, WindowPlan};
