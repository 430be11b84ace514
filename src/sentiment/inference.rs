//! Hosted text-classification inference (FinBERT by default)
//!
//! Talks to a Hugging Face style endpoint: `POST {"inputs": text}` returning
//! label/score pairs. The highest-scoring label is used.

use super::SentimentCapability;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";

/// Text used to check the endpoint at startup
const PROBE_TEXT: &str = "Markets were steady today.";

pub struct InferenceClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

impl InferenceClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pick the top label out of an inference response body.
pub(crate) fn parse_top_label(body: &str) -> Result<String> {
    let response: InferenceResponse = serde_json::from_str(body)?;
    let candidates = match response {
        InferenceResponse::Nested(mut outer) => {
            if outer.is_empty() {
                Vec::new()
            } else {
                outer.swap_remove(0)
            }
        }
        InferenceResponse::Flat(inner) => inner,
        InferenceResponse::Error { error } => return Err(PipelineError::Capability(error)),
    };

    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|c| c.label)
        .ok_or_else(|| PipelineError::Capability("Empty response from inference endpoint".into()))
}

#[async_trait]
impl SentimentCapability for InferenceClient {
    async fn classify_sentiment(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText);
        }

        let request = InferenceRequest {
            inputs: text,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let mut req = self.http.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(PipelineError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            tracing::debug!("Inference endpoint returned {}: {}", status, snippet);
            return Err(PipelineError::Unavailable {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        parse_top_label(&body)
    }

    async fn probe(&self) -> Result<()> {
        self.classify_sentiment(PROBE_TEXT).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}
