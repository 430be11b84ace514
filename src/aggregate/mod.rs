//! Daily per-topic sentiment aggregation
//!
//! Records are bucketed by (topic, calendar date of `created_at`). Records
//! with an unparseable timestamp are dropped. Failed scores count toward
//! neither numerator nor denominator, and a bucket with no valid score is
//! left out instead of being reported as zero.

pub mod timestamp;

#[cfg(test)]
mod tests;

pub use timestamp::parse_date;

use crate::types::{AggregateRow, ScoredRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregated rows plus counters for the run summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    /// Sorted by (topic, date)
    pub rows: Vec<AggregateRow>,
    /// Records dropped for an unparseable timestamp
    pub invalid_dates: usize,
    /// Records kept for grouping but without a score
    pub null_scores: usize,
    /// (topic, date) pairs left out because none of their scores were valid
    pub empty_groups: usize,
}

/// Group scored records by (topic, date) and average their scores.
pub fn aggregate(records: &[ScoredRecord]) -> AggregateReport {
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<f64>> = BTreeMap::new();
    let mut report = AggregateReport::default();

    for scored in records {
        let Some(date) = parse_date(&scored.record.created_at) else {
            debug!(
                "Dropping line {}: unparseable timestamp {:?}",
                scored.record.line, scored.record.created_at
            );
            report.invalid_dates += 1;
            continue;
        };

        let scores = groups.entry((scored.topic.as_str(), date)).or_default();
        match scored.sentiment_score() {
            Some(score) => scores.push(score),
            None => report.null_scores += 1,
        }
    }

    for ((topic, date), mut scores) in groups {
        if scores.is_empty() {
            report.empty_groups += 1;
            continue;
        }

        // fixed summation order keeps the output independent of input order
        scores.sort_by(f64::total_cmp);
        let mean_sentiment = scores.iter().sum::<f64>() / scores.len() as f64;

        report.rows.push(AggregateRow {
            topic: topic.to_string(),
            date,
            mean_sentiment,
        });
    }

    report
}
