/// Multiplier in `[0.5, 1.5]` that widens the gap between weak and strong items.
pub fn score_multiplier(score: f64) -> f64 {
    0.5 + clamp_score(score) / 100.0
}

/// Total interactions an item should collect over its whole lifetime.
pub fn lifetime_target(score: f64, min_interactions: u64, max_interactions: u64) -> u64 {
    let score = clamp_score(score);
    let min = min_interactions as f64;
    let max = max_interactions.max(min_interactions) as f64;
    let raw_target = min + (max - min) * (score / 100.0);
    (raw_target * score_multiplier(score)).round().max(0.0) as u64
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
