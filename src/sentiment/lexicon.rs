//! Offline lexicon sentiment classifier
//!
//! VADER-style scoring with a finance/macro word list, boosters and negation.
//! Deterministic and network-free, for dry runs and environments without
//! access to a hosted model.

use super::{SentimentCapability, SentimentLabel};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Compound score at or beyond which a text is non-neutral
const NEUTRAL_BAND: f64 = 0.05;

pub struct LexiconClassifier {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let words: &[(&str, f64)] = &[
            // positive
            ("good", 0.5),
            ("great", 0.7),
            ("strong", 0.5),
            ("stronger", 0.5),
            ("robust", 0.6),
            ("solid", 0.4),
            ("beat", 0.5),
            ("beats", 0.5),
            ("gain", 0.5),
            ("gains", 0.5),
            ("rally", 0.6),
            ("rallies", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("growth", 0.4),
            ("expansion", 0.4),
            ("improve", 0.4),
            ("improves", 0.4),
            ("improving", 0.4),
            ("optimism", 0.6),
            ("optimistic", 0.6),
            ("boom", 0.5),
            ("surplus", 0.3),
            ("cooling", 0.3),
            ("easing", 0.3),
            ("stable", 0.3),
            ("resilient", 0.5),
            ("upbeat", 0.5),
            ("success", 0.6),
            ("positive", 0.5),
            // negative
            ("bad", -0.5),
            ("weak", -0.5),
            ("weaker", -0.5),
            ("miss", -0.4),
            ("misses", -0.4),
            ("loss", -0.6),
            ("losses", -0.6),
            ("decline", -0.5),
            ("declines", -0.5),
            ("drop", -0.4),
            ("drops", -0.4),
            ("fall", -0.4),
            ("falls", -0.4),
            ("slump", -0.6),
            ("plunge", -0.7),
            ("crash", -0.7),
            ("recession", -0.6),
            ("downturn", -0.6),
            ("slowdown", -0.5),
            ("stagnation", -0.5),
            ("layoffs", -0.6),
            ("crisis", -0.7),
            ("default", -0.6),
            ("deficit", -0.3),
            ("fear", -0.5),
            ("fears", -0.5),
            ("panic", -0.6),
            ("worry", -0.4),
            ("worries", -0.4),
            ("risk", -0.3),
            ("pessimism", -0.6),
            ("pessimistic", -0.6),
            ("bubble", -0.5),
            ("negative", -0.5),
            ("terrible", -0.8),
        ];
        let boosters: &[(&str, f64)] = &[
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("sharply", 1.4),
            ("significantly", 1.3),
            ("highly", 1.3),
            ("massively", 1.4),
        ];

        Self {
            lexicon: words.iter().copied().collect(),
            boosters: boosters.iter().copied().collect(),
            negations: vec![
                "not", "no", "never", "none", "nothing", "isn't", "aren't", "wasn't",
                "weren't", "hasn't", "haven't", "doesn't", "don't", "didn't", "won't",
                "can't", "cannot", "without",
            ],
        }
    }

    /// Compound score in [-1.0, 1.0]
    pub fn compound(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<String> = lower.split_whitespace().map(clean_word).collect();

        let sum: f64 = words
            .iter()
            .enumerate()
            .filter_map(|(i, w)| {
                self.lexicon
                    .get(w.as_str())
                    .map(|&score| self.apply_modifiers(&words, i, score))
            })
            .sum();

        normalize(sum)
    }

    pub fn label(&self, text: &str) -> SentimentLabel {
        let compound = self.compound(text);
        if compound >= NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if compound <= -NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Apply boosters and negations from up to three preceding words
    fn apply_modifiers(&self, words: &[String], index: usize, mut score: f64) -> f64 {
        for prev in &words[index.saturating_sub(3)..index] {
            if let Some(&factor) = self.boosters.get(prev.as_str()) {
                score *= factor;
            }
            if self.negations.iter().any(|n| *n == prev.as_str()) {
                score *= -0.5;
            }
        }
        score.clamp(-1.0, 1.0)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .collect()
}

fn normalize(score: f64) -> f64 {
    let alpha = 15.0;
    score / (score * score + alpha).sqrt()
}

#[async_trait]
impl SentimentCapability for LexiconClassifier {
    async fn classify_sentiment(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText);
        }
        Ok(self.label(text).as_str().to_string())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
