use serde::{Deserialize, Serialize};

/// A list of cue words that each add `weight` when present in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueRule {
    pub name: String,
    pub weight: f64,
    pub words: Vec<String>,
}

impl CueRule {
    pub fn new(name: &str, weight: f64, words: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            words: words.iter().map(|word| word.to_string()).collect(),
        }
    }
}

/// Weighted rule table behind the virality score (STEPPS cues).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub base: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Flat bonus when the category contains one of `trigger_categories` as
    /// whole words ("World Politics" hits `politics`, "biotech" misses `tech`).
    pub category_bonus: f64,
    pub trigger_categories: Vec<String>,
    /// Flat bonus for carrying at least one theme tag.
    pub theme_bonus: f64,
    /// Flat bonus for carrying more than `keyword_threshold` keyword tags.
    pub keyword_bonus: f64,
    pub keyword_threshold: usize,
    pub cues: Vec<CueRule>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base: 50.0,
            min_score: 0.0,
            max_score: 100.0,
            category_bonus: 10.0,
            trigger_categories: [
                "politics",
                "technology",
                "health",
                "money",
                "scandal",
                "política",
                "politica",
                "tecnologia",
                "saúde",
                "saude",
                "dinheiro",
                "escândalo",
                "escandalo",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
            theme_bonus: 5.0,
            keyword_bonus: 5.0,
            keyword_threshold: 3,
            cues: vec![
                CueRule::new(
                    "social_currency",
                    5.0,
                    &[
                        "exclusive",
                        "breaking",
                        "leaked",
                        "insider",
                        "first look",
                        "secret",
                        "exclusivo",
                        "urgente",
                        "vazou",
                        "vazado",
                        "bastidor",
                        "segredo",
                    ],
                ),
                CueRule::new(
                    "high_arousal",
                    8.0,
                    &[
                        "shocking",
                        "outrage",
                        "crisis",
                        "warning",
                        "alarming",
                        "furious",
                        "chaos",
                        "chocante",
                        "revolta",
                        "crise",
                        "alerta",
                        "polêmica",
                        "polemica",
                        "absurdo",
                        "caos",
                    ],
                ),
                CueRule::new(
                    "practical_value",
                    5.0,
                    &[
                        "how to",
                        "guide",
                        "tips",
                        "step by step",
                        "tutorial",
                        "como fazer",
                        "guia",
                        "dicas",
                        "passo a passo",
                    ],
                ),
                CueRule::new(
                    "narrative",
                    4.0,
                    &[
                        "story",
                        "journey",
                        "revealed",
                        "behind the scenes",
                        "história",
                        "historia",
                        "jornada",
                        "revelou",
                        "revelado",
                    ],
                ),
            ],
        }
    }
}
