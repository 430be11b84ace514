//! Configuration management

use crate::error::{PipelineError, Result};
use crate::topic::{Taxonomy, TopicDefinition};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub sentiment: SentimentConfig,
    /// Ordered topic list; the built-in macro taxonomy when absent
    pub taxonomy: Option<Vec<TopicDefinition>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// CSV file with one post per row
    pub path: PathBuf,
    /// Column holding the post text
    pub text_column: String,
    /// Column holding the creation timestamp
    pub timestamp_column: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Aggregated CSV, overwritten on each run
    pub path: PathBuf,
    /// Optional SQLite database mirroring the CSV
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBackend {
    Huggingface,
    Llm,
    Lexicon,
}

impl std::str::FromStr for SentimentBackend {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" | "finbert" => Ok(SentimentBackend::Huggingface),
            "llm" | "openai" => Ok(SentimentBackend::Llm),
            "lexicon" => Ok(SentimentBackend::Lexicon),
            other => Err(PipelineError::Config(format!("Unknown sentiment backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub backend: SentimentBackend,
    /// Endpoint URL (inference URL or OpenAI-compatible base URL)
    pub endpoint: Option<String>,
    /// Model name (LLM backend)
    pub model: Option<String>,
    /// API key / bearer token
    pub api_key: Option<String>,
    /// Maximum in-flight capability calls
    pub max_concurrency: usize,
    /// Retries for transient capability errors
    pub max_retries: u32,
    /// First retry delay in milliseconds, doubled per attempt
    pub retry_base_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Check the capability is reachable before scoring
    pub probe_on_start: bool,
}

impl Config {
    /// Load configuration from file, then environment overrides.
    /// The file must exist.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_from(path.as_ref(), true)
    }

    /// Like [`Config::load`], but a missing file means built-in defaults.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_from(path.as_ref(), false)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&expanded).required(required))
            .add_source(
                config::Environment::with_prefix("MACRO_SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.input.path = expand_path(&config.input.path);
        config.output.path = expand_path(&config.output.path);
        config.output.sqlite_path = config.output.sqlite_path.as_deref().map(expand_path);
        Ok(config)
    }

    /// Build the active taxonomy
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.taxonomy {
            Some(topics) => Taxonomy::new(topics.clone()),
            None => Ok(Taxonomy::macro_default()),
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sorted_extracted_tweet_data.csv"),
            text_column: "fullText".to_string(),
            timestamp_column: "createdAt".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("aggregated_sentiment_by_topic.csv"),
            sqlite_path: None,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend: SentimentBackend::Huggingface,
            endpoint: None,
            model: None,
            api_key: None,
            max_concurrency: 4,
            max_retries: 2,
            retry_base_ms: 500,
            timeout_secs: 30,
            probe_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input.text_column, "fullText");
        assert_eq!(config.input.timestamp_column, "createdAt");
        assert_eq!(config.sentiment.backend, SentimentBackend::Huggingface);
        assert_eq!(config.sentiment.max_concurrency, 4);
        assert!(config.sentiment.probe_on_start);
        assert!(config.output.sqlite_path.is_none());
    }

    #[test]
    fn test_missing_optional_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_optional(dir.path().join("absent.toml")).unwrap();
        assert_eq!(
            config.output.path,
            PathBuf::from("aggregated_sentiment_by_topic.csv")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(dir.path().join("typo.toml")).is_err());
    }

    #[test]
    fn test_load_toml_with_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[input]
path = "posts.csv"
text_column = "body"

[sentiment]
backend = "lexicon"
max_concurrency = 2

[[taxonomy]]
name = "energy"
keywords = ["oil", "OPEC"]

[[taxonomy]]
name = "housing"
keywords = ["mortgage"]
"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.input.path, PathBuf::from("posts.csv"));
        assert_eq!(config.input.text_column, "body");
        assert_eq!(config.input.timestamp_column, "createdAt");
        assert_eq!(config.sentiment.backend, SentimentBackend::Lexicon);
        assert_eq!(config.sentiment.max_concurrency, 2);

        let taxonomy = config.taxonomy().unwrap();
        assert_eq!(taxonomy.topics().len(), 2);
        assert_eq!(taxonomy.classify("OPEC cuts output"), "energy");
    }

    #[test]
    fn test_invalid_taxonomy_rejected() {
        let config = Config {
            taxonomy: Some(vec![TopicDefinition::new("bad", &[""])]),
            ..Config::default()
        };
        assert!(config.taxonomy().is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("finbert".parse::<SentimentBackend>().unwrap(), SentimentBackend::Huggingface);
        assert_eq!("LLM".parse::<SentimentBackend>().unwrap(), SentimentBackend::Llm);
        assert!("vader".parse::<SentimentBackend>().is_err());
    }
}
