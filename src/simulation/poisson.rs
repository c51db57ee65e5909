use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

/// How rates at or above the threshold are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LargeRateMethod {
    Exact,
    Normal,
}

impl LargeRateMethod {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "exact" | "poisson" => Some(LargeRateMethod::Exact),
            "normal" | "gaussian" => Some(LargeRateMethod::Normal),
            _ => None,
        }
    }
}

/// Draws Poisson-distributed counts from a caller-supplied RNG.
#[derive(Debug, Clone)]
pub struct PoissonSampler {
    normal_threshold: f64,
    large_rate: LargeRateMethod,
}

impl Default for PoissonSampler {
    fn default() -> Self {
        Self {
            normal_threshold: 30.0,
            large_rate: LargeRateMethod::Exact,
        }
    }
}

impl PoissonSampler {
    pub fn new(normal_threshold: f64, large_rate: LargeRateMethod) -> Self {
        Self {
            normal_threshold,
            large_rate,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, lambda: f64) -> u64 {
        if !lambda.is_finite() || lambda <= 0.0 {
            return 0;
        }
        if lambda < self.normal_threshold {
            if let Some(draw) = knuth(rng, lambda) {
                return draw;
            }
        }
        match self.large_rate {
            LargeRateMethod::Exact => match Poisson::new(lambda) {
                Ok(poisson) => {
                    let draw: f64 = poisson.sample(rng);
                    draw.max(0.0) as u64
                }
                Err(_) => normal_approximation(rng, lambda),
            },
            LargeRateMethod::Normal => normal_approximation(rng, lambda),
        }
    }
}

// Multiply uniforms until the product falls below e^-lambda. None once
// e^-lambda underflows, since the product could never drop below it.
fn knuth<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> Option<u64> {
    let limit = (-lambda).exp();
    if limit <= 0.0 {
        return None;
    }
    let mut product = 1.0;
    let mut draws = 0u64;
    loop {
        draws += 1;
        product *= rng.gen::<f64>();
        if product < limit {
            return Some(draws - 1);
        }
    }
}

fn normal_approximation<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    match Normal::new(lambda, lambda.sqrt()) {
        Ok(normal) => normal.sample(rng).round().max(0.0) as u64,
        Err(_) => lambda.round() as u64,
    }
}
