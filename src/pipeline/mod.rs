//! Batch pipeline orchestration
//!
//! Load → validate columns → classify → score → aggregate → write.
//!
//! Only dataset-shape and environment problems abort a run. Per-record
//! problems (a failed score, an unparseable timestamp) are absorbed by the
//! scorer and the aggregator, unless every non-empty text failed to score:
//! that means the capability is down and the run aborts before writing.


use crate::aggregate::{aggregate, AggregateReport};
use crate::config::{Config, OutputConfig};
use crate::error::{PipelineError, Result};
use crate::ingester::{CsvSource, DatasetSource};
use crate::sentiment::{
    build_capability, RetryPolicy, ScoreOutcome, SentimentCapability, SentimentScorer,
};
use crate::storage::{self, Database};
use crate::topic::Taxonomy;
use crate::types::ScoredRecord;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a run produced before persistence
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub scored: Vec<ScoredRecord>,
    pub report: AggregateReport,
}

impl PipelineOutput {
    pub fn scoring_failures(&self) -> usize {
        self.scored.iter().filter(|s| s.outcome.is_failed()).count()
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub scoring_failures: usize,
    pub invalid_dates: usize,
    pub rows_written: usize,
    pub output_path: PathBuf,
}

pub struct Pipeline {
    taxonomy: Taxonomy,
    text_column: String,
    timestamp_column: String,
    max_concurrency: usize,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            text_column: "fullText".to_string(),
            timestamp_column: "createdAt".to_string(),
            max_concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.taxonomy()?)
            .with_columns(&config.input.text_column, &config.input.timestamp_column)
            .with_concurrency(config.sentiment.max_concurrency)
            .with_retry(RetryPolicy {
                max_retries: config.sentiment.max_retries,
                base_delay: Duration::from_millis(config.sentiment.retry_base_ms),
            }))
    }

    pub fn with_columns(mut self, text: &str, timestamp: &str) -> Self {
        self.text_column = text.to_string();
        self.timestamp_column = timestamp.to_string();
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Run every stage up to aggregation.
    ///
    /// `init_capability` is invoked once, after the dataset passed column
    /// validation, and the capability it returns is shared by all records.
    pub async fn execute<F, Fut>(
        &self,
        source: &dyn DatasetSource,
        init_capability: F,
    ) -> Result<PipelineOutput>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn SentimentCapability>>>,
    {
        let table = source.load().await?;
        let columns = table.require_columns(&self.text_column, &self.timestamp_column)?;
        let records = table.into_records(columns);
        info!("Loaded {} records from {} source", records.len(), source.name());

        let topics: Vec<String> = records
            .iter()
            .map(|r| self.taxonomy.classify(&r.text).to_string())
            .collect();
        info!("Topic classification completed");

        let capability = init_capability().await?;
        let scorer = SentimentScorer::new(capability)
            .with_concurrency(self.max_concurrency)
            .with_retry(self.retry);
        info!(
            "Scoring {} records with {} (max {} in flight)",
            records.len(),
            scorer.capability_name(),
            self.max_concurrency.max(1)
        );

        let items: Vec<(usize, &str)> = records.iter().map(|r| (r.line, r.text.as_str())).collect();
        let outcomes = scorer.score_all(&items).await;
        check_capability_alive(&items, &outcomes)?;

        let scored: Vec<ScoredRecord> = records
            .into_iter()
            .zip(topics)
            .zip(outcomes)
            .map(|((record, topic), outcome)| ScoredRecord::new(record, topic, outcome))
            .collect();

        let report = aggregate(&scored);
        let output = PipelineOutput { scored, report };
        info!(
            "Aggregated {} rows ({} scoring failures, {} invalid dates, {} empty groups)",
            output.report.rows.len(),
            output.scoring_failures(),
            output.report.invalid_dates,
            output.report.empty_groups
        );

        Ok(output)
    }
}

/// Fail when every non-empty text failed to score.
///
/// Blank texts are rejected by every backend, so they do not count as
/// attempts.
fn check_capability_alive(items: &[(usize, &str)], outcomes: &[ScoreOutcome]) -> Result<()> {
    let mut attempted = 0;
    let mut last_error = None;
    for ((_, text), outcome) in items.iter().zip(outcomes) {
        if text.trim().is_empty() {
            continue;
        }
        attempted += 1;
        match outcome {
            ScoreOutcome::Scored(_) => return Ok(()),
            ScoreOutcome::Failed(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(PipelineError::ScoringFailed {
            attempted,
            last_error: e.clone(),
        }),
        None => Ok(()),
    }
}

/// Run the configured batch job end to end
pub async fn run(config: &Config) -> Result<RunSummary> {
    let source = CsvSource::new(&config.input.path);
    let sentiment = config.sentiment.clone();
    run_with(config, &source, move || async move { build_capability(&sentiment).await }).await
}

/// Run against an explicit source and capability constructor
pub async fn run_with<F, Fut>(
    config: &Config,
    source: &dyn DatasetSource,
    init_capability: F,
) -> Result<RunSummary>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn SentimentCapability>>>,
{
    let pipeline = Pipeline::from_config(config)?;
    let output = pipeline.execute(source, init_capability).await?;

    write_outputs(&output, &config.output).await?;

    Ok(RunSummary {
        records: output.scored.len(),
        scoring_failures: output.scoring_failures(),
        invalid_dates: output.report.invalid_dates,
        rows_written: output.report.rows.len(),
        output_path: config.output.path.clone(),
    })
}

/// Mirror first, then the CSV, so a failed mirror leaves the CSV untouched.
async fn write_outputs(output: &PipelineOutput, config: &OutputConfig) -> Result<()> {
    if let Some(sqlite_path) = &config.sqlite_path {
        let db = Database::connect(sqlite_path).await?;
        db.replace_rows(&output.report.rows).await?;
        info!("Mirrored rows to {}", sqlite_path.display());
    }

    storage::write_csv(&output.report.rows, &config.path)?;
    info!("Wrote {} rows to {}", output.report.rows.len(), config.path.display());

    Ok(())
}
