use serde::{Deserialize, Serialize};

use crate::scoring::ScoringRules;
use crate::ScoringInput;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule: String,
    pub matches: Vec<String>,
    pub bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub hits: Vec<RuleHit>,
    pub raw: f64,
    pub score: f64,
}

/// Deterministic keyword scorer driven by a [`ScoringRules`] table.
#[derive(Debug, Clone)]
pub struct ViralityScorer {
    rules: ScoringRules,
}

impl Default for ViralityScorer {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

impl ViralityScorer {
    pub fn new(mut rules: ScoringRules) -> Self {
        rules.trigger_categories = rules
            .trigger_categories
            .iter()
            .map(|value| normalize(value))
            .filter(|value| !value.is_empty())
            .collect();
        for cue in rules.cues.iter_mut() {
            cue.words = cue
                .words
                .iter()
                .map(|word| normalize(word))
                .filter(|word| !word.is_empty())
                .collect();
        }
        Self { rules }
    }

    pub fn score(&self, input: &ScoringInput<'_>) -> f64 {
        self.breakdown(input).score
    }

    pub fn breakdown(&self, input: &ScoringInput<'_>) -> ScoreBreakdown {
        let text = normalize(&input.text());
        let mut hits = Vec::new();

        for cue in &self.rules.cues {
            let matches: Vec<String> = cue
                .words
                .iter()
                .filter(|word| text.contains(word.as_str()))
                .cloned()
                .collect();
            if !matches.is_empty() {
                hits.push(RuleHit {
                    rule: cue.name.clone(),
                    bonus: cue.weight * matches.len() as f64,
                    matches,
                });
            }
        }

        if let Some(category) = input.category.map(tokens) {
            let trigger = self
                .rules
                .trigger_categories
                .iter()
                .find(|trigger| contains_words(&category, &tokens(trigger)));
            if let Some(trigger) = trigger {
                hits.push(RuleHit {
                    rule: "category".to_string(),
                    matches: vec![trigger.clone()],
                    bonus: self.rules.category_bonus,
                });
            }
        }

        if input.themes.iter().any(|theme| !theme.trim().is_empty()) {
            hits.push(RuleHit {
                rule: "themes".to_string(),
                matches: input.themes.to_vec(),
                bonus: self.rules.theme_bonus,
            });
        }

        if input.keywords.len() > self.rules.keyword_threshold {
            hits.push(RuleHit {
                rule: "keywords".to_string(),
                matches: input.keywords.to_vec(),
                bonus: self.rules.keyword_bonus,
            });
        }

        let raw = self.rules.base + hits.iter().map(|hit| hit.bonus).sum::<f64>();
        let score = raw.max(self.rules.min_score).min(self.rules.max_score);

        ScoreBreakdown {
            base: self.rules.base,
            hits,
            raw,
            score,
        }
    }
}

fn tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
