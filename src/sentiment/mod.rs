//! Sentiment scoring
//!
//! Wraps an external text-classification capability and turns its labels into
//! numeric scores:
//! - `positive` => +1.0
//! - `negative` => -1.0
//! - anything else => 0.0
//!
//! A failing record never aborts the batch. [`SentimentScorer`] turns every
//! capability error into [`ScoreOutcome::Failed`] after logging it.

pub mod inference;
pub mod lexicon;
pub mod llm;


pub use inference::InferenceClient;
pub use lexicon::LexiconClassifier;
pub use llm::LlmClassifier;

use crate::config::{SentimentBackend, SentimentConfig};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Characters of text included in failure logs
const LOG_PREVIEW_CHARS: usize = 60;

/// Black-box sentiment classifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentCapability: Send + Sync {
    /// Classify one text and return the raw label.
    async fn classify_sentiment(&self, text: &str) -> Result<String>;

    /// Check that the capability is reachable before a run.
    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Normalized sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Map a raw label; unknown labels are neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            SentimentLabel::Positive => 1.0,
            SentimentLabel::Negative => -1.0,
            SentimentLabel::Neutral => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// Result of scoring a single record
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(f64),
    Failed(String),
}

impl ScoreOutcome {
    /// The score, or `None` if scoring failed
    pub fn score(&self) -> Option<f64> {
        match self {
            ScoreOutcome::Scored(s) => Some(*s),
            ScoreOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScoreOutcome::Failed(_))
    }
}

/// Retry settings for transient capability errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_for(&self, attempt: u32, err: &PipelineError) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        match err {
            PipelineError::RateLimited { retry_after_secs } => {
                backoff.max(Duration::from_secs(*retry_after_secs))
            }
            _ => backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Scores records against one shared capability
pub struct SentimentScorer {
    capability: Arc<dyn SentimentCapability>,
    max_concurrency: usize,
    retry: RetryPolicy,
}

impl SentimentScorer {
    pub fn new(capability: Arc<dyn SentimentCapability>) -> Self {
        Self {
            capability,
            max_concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }

    /// Maximum number of in-flight capability calls (at least 1)
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn capability_name(&self) -> &'static str {
        self.capability.name()
    }

    /// Score one text. Errors are logged and returned as `Failed`.
    ///
    /// `line` is the record's source line, used only in logs.
    pub async fn score(&self, line: usize, text: &str) -> ScoreOutcome {
        let mut attempt = 0;
        loop {
            match self.capability.classify_sentiment(text).await {
                Ok(label) => return ScoreOutcome::Scored(SentimentLabel::from_label(&label).score()),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt, &e);
                    tracing::debug!(
                        "Line {}: transient scoring error ({}), retrying in {:?}",
                        line,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Sentiment scoring failed for line {} ({:?}): {}",
                        line,
                        preview(text),
                        e
                    );
                    return ScoreOutcome::Failed(e.to_string());
                }
            }
        }
    }

    /// Score `(line, text)` pairs with bounded concurrency.
    ///
    /// The returned vector is index-aligned with `items`.
    pub async fn score_all<S: AsRef<str>>(&self, items: &[(usize, S)]) -> Vec<ScoreOutcome> {
        stream::iter(items.iter())
            .map(|(line, text)| self.score(*line, text.as_ref()))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }
}

/// Build the configured capability. Called once per run.
pub async fn build_capability(config: &SentimentConfig) -> Result<Arc<dyn SentimentCapability>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let capability: Arc<dyn SentimentCapability> = match config.backend {
        SentimentBackend::Huggingface => Arc::new(InferenceClient::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            timeout,
        )?),
        SentimentBackend::Llm => Arc::new(LlmClassifier::from_config(config)?),
        SentimentBackend::Lexicon => Arc::new(LexiconClassifier::new()),
    };

    if config.probe_on_start {
        capability.probe().await.map_err(|e| {
            PipelineError::Capability(format!("{} is unreachable: {}", capability.name(), e))
        })?;
        tracing::info!("Sentiment capability {} is reachable", capability.name());
    }

    Ok(capability)
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
