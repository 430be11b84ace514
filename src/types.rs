//! Core data types

use crate::ingester::Record;
use crate::sentiment::ScoreOutcome;
use chrono::NaiveDate;

/// A record after topic classification and sentiment scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: Record,
    pub topic: String,
    pub outcome: ScoreOutcome,
}

impl ScoredRecord {
    pub fn new(record: Record, topic: impl Into<String>, outcome: ScoreOutcome) -> Self {
        Self {
            record,
            topic: topic.into(),
            outcome,
        }
    }

    /// `None` when scoring failed
    pub fn sentiment_score(&self) -> Option<f64> {
        self.outcome.score()
    }
}

/// Mean sentiment for one (topic, date) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub topic: String,
    pub date: NaiveDate,
    pub mean_sentiment: f64,
}
