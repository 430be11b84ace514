//! Error types for the sentiment pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Sentiment capability error: {0}")]
    Capability(String),

    #[error("Capability unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Sentiment scoring failed for all {attempted} non-empty records; last error: {last_error}")]
    ScoringFailed { attempted: usize, last_error: String },

    #[error("Cannot score empty text")]
    EmptyText,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            PipelineError::Unavailable { status } => *status >= 500,
            PipelineError::RateLimited { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
