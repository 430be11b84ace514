//! LLM-backed sentiment classifier
//!
//! Uses any OpenAI-compatible chat completion API (OpenAI, DeepSeek, Ollama,
//! vLLM, ...) and asks for a one-word label.

use super::SentimentCapability;
use crate::config::SentimentConfig;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct LlmClassifier {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClassifier {
    pub fn new(base_url: String, api_key: Option<String>, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model,
        })
    }

    /// Create from config
    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url == DEFAULT_BASE_URL && config.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(PipelineError::Config(
                "api_key required for the default LLM endpoint".into(),
            ));
        }

        Self::new(
            base_url,
            config.api_key.clone(),
            config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_prompt(text: &str) -> String {
        format!(
            r#"You are a financial sentiment classifier. Classify the sentiment of the following social-media post about the economy.

Post: {}

Respond with exactly one word: positive, negative, or neutral."#,
            text
        )
    }
}

/// Extract a label from a free-form model reply.
///
/// The first of `positive`/`negative`/`neutral` mentioned wins; other
/// replies are passed through and later score as neutral.
pub(crate) fn parse_reply(reply: &str) -> Result<String> {
    let lower = reply.trim().to_lowercase();
    if lower.is_empty() {
        return Err(PipelineError::Capability("Empty response from LLM".into()));
    }

    let found = ["positive", "negative", "neutral"]
        .iter()
        .filter_map(|label| lower.find(label).map(|pos| (pos, *label)))
        .min_by_key(|(pos, _)| *pos);

    Ok(match found {
        Some((_, label)) => label.to_string(),
        None => lower,
    })
}

#[async_trait]
impl SentimentCapability for LlmClassifier {
    async fn classify_sentiment(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::build_prompt(text),
            }],
            temperature: 0.0,
            max_tokens: 5,
        };

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("content-type", "application/json");

        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(&request).send().await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited { retry_after_secs: 1 });
        }
        if !status.is_success() {
            return Err(PipelineError::Unavailable {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        let response: ChatResponse = serde_json::from_str(&text)?;

        let reply = response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| PipelineError::Capability("Empty response from LLM".into()))?;

        parse_reply(&reply)
    }

    async fn probe(&self) -> Result<()> {
        self.classify_sentiment("Markets were steady today.").await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SentimentBackend;

    #[test]
    fn test_parse_reply_plain() {
        assert_eq!(parse_reply("positive").unwrap(), "positive");
        assert_eq!(parse_reply("  Negative.\n").unwrap(), "negative");
    }

    #[test]
    fn test_parse_reply_first_label_wins() {
        assert_eq!(
            parse_reply("Neutral, though slightly positive").unwrap(),
            "neutral"
        );
    }

    #[test]
    fn test_parse_reply_unknown_passthrough() {
        assert_eq!(parse_reply("Mixed").unwrap(), "mixed");
    }

    #[test]
    fn test_parse_reply_empty() {
        assert!(parse_reply("   ").is_err());
    }

    #[test]
    fn test_default_endpoint_requires_key() {
        let config = SentimentConfig {
            backend: SentimentBackend::Llm,
            ..SentimentConfig::default()
        };
        assert!(matches!(
            LlmClassifier::from_config(&config),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let config = SentimentConfig {
            backend: SentimentBackend::Llm,
            endpoint: Some("http://localhost:11434/".to_string()),
            model: Some("qwen2.5:14b".to_string()),
            ..SentimentConfig::default()
        };
        let llm = LlmClassifier::from_config(&config).unwrap();
        assert_eq!(llm.base_url, "http://localhost:11434");
        assert_eq!(llm.model, "qwen2.5:14b");
        assert!(llm.api_key.is_none());
    }
}
