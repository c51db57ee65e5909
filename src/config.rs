use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::scoring::ScoringRules;
use crate::simulation::{LargeRateMethod, PoissonSampler};

/// Above this rate e^-lambda gets too close to underflow for the
/// multiplicative sampler.
pub const MAX_NORMAL_THRESHOLD: f64 = 700.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/engagement.json"),
        }
    }
}

/// Bounds on the window length derived from the time since the last run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub default_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_hours: 6.0,
            min_hours: 0.25,
            max_hours: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub lookback_days: i64,
    pub article_scan_limit: usize,
    pub image_limit: usize,
    pub image_weight: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            article_scan_limit: 100,
            image_limit: 20,
            image_weight: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub normal_threshold: f64,
    pub large_rate: LargeRateMethod,
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            normal_threshold: 30.0,
            large_rate: LargeRateMethod::Exact,
            seed: None,
        }
    }
}

impl SamplerConfig {
    pub fn build(&self) -> PoissonSampler {
        PoissonSampler::new(self.normal_threshold, self.large_rate)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub window: WindowConfig,
    pub selection: SelectionConfig,
    pub sampler: SamplerConfig,
    pub rules: ScoringRules,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload)
            .map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        let window = &self.window;
        for (name, value) in [
            ("default_hours", window.default_hours),
            ("min_hours", window.min_hours),
            ("max_hours", window.max_hours),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "window {} must be positive and finite, got {}",
                    name, value
                ));
            }
        }
        if window.min_hours > window.max_hours {
            return Err(format!(
                "invalid window bounds: min {} max {}",
                window.min_hours, window.max_hours
            ));
        }
        let threshold = self.sampler.normal_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > MAX_NORMAL_THRESHOLD {
            return Err(format!(
                "sampler normal_threshold must be within (0, {}], got {}",
                MAX_NORMAL_THRESHOLD, threshold
            ));
        }
        if !self.selection.image_weight.is_finite()
            || !(0.0..=1.0).contains(&self.selection.image_weight)
        {
            return Err(format!(
                "image_weight must be within [0, 1], got {}",
                self.selection.image_weight
            ));
        }
        if self.selection.lookback_days <= 0 {
            return Err("lookback_days must be positive".to_string());
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("ENGAGEMENT_STORE_PATH") {
            if !path.trim().is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }
        if let Ok(hours) = env::var("ENGAGEMENT_WINDOW_HOURS") {
            if let Ok(value) = hours.parse::<f64>() {
                self.window.default_hours = value;
            }
        }
        if let Ok(seed) = env::var("ENGAGEMENT_SEED") {
            if let Ok(value) = seed.parse::<u64>() {
                self.sampler.seed = Some(value);
            }
        }
        if let Ok(method) = env::var("ENGAGEMENT_LARGE_RATE") {
            if let Some(value) = LargeRateMethod::from_str(&method) {
                self.sampler.large_rate = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ENGAGEMENT_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/engagement.toml")))
}
