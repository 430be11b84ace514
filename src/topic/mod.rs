//! Keyword-based macroeconomic topic classification
//!
//! A [`Taxonomy`] is an ordered list of topics. Classification walks the list
//! in definition order and returns the first topic whose keywords occur in the
//! text, so the order of the list decides ties. Reordering topics changes
//! results for any text that matches more than one of them.


use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// Label assigned to texts that match no topic.
pub const OTHER_TOPIC: &str = "other";

/// One topic and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicDefinition {
    pub name: String,
    pub keywords: Vec<String>,
}

impl TopicDefinition {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, text_lower: &str) -> bool {
        self.keywords.iter().any(|k| text_lower.contains(k.as_str()))
    }
}

/// Ordered topic taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    topics: Vec<TopicDefinition>,
}

impl Taxonomy {
    /// Build a taxonomy, keeping the given order.
    ///
    /// Keywords are lowercased. Empty keywords, duplicate topic names and the
    /// reserved name `"other"` are rejected.
    pub fn new(topics: Vec<TopicDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(topics.len());

        for topic in topics {
            let name = topic.name.trim().to_string();
            if name.is_empty() {
                return Err(PipelineError::Taxonomy("topic name cannot be empty".into()));
            }
            if name == OTHER_TOPIC {
                return Err(PipelineError::Taxonomy(format!(
                    "'{}' is reserved for unmatched texts",
                    OTHER_TOPIC
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(PipelineError::Taxonomy(format!("duplicate topic '{}'", name)));
            }

            let mut keywords = Vec::with_capacity(topic.keywords.len());
            for keyword in topic.keywords {
                // an empty keyword is a substring of every text
                if keyword.trim().is_empty() {
                    return Err(PipelineError::Taxonomy(format!(
                        "topic '{}' has an empty keyword",
                        name
                    )));
                }
                keywords.push(keyword.to_lowercase());
            }

            normalized.push(TopicDefinition { name, keywords });
        }

        Ok(Self { topics: normalized })
    }

    /// The built-in macroeconomic taxonomy.
    pub fn macro_default() -> Self {
        Self {
            topics: vec![
                TopicDefinition::new(
                    "inflation",
                    &[
                        "inflation",
                        "flation",
                        "cpi",
                        "consumer price index",
                        "product price index",
                        "ppi",
                        "price stability",
                        "consumer prices",
                        "shrinkflation",
                        "disinflationary",
                        "disinflation",
                        "cost of living",
                        "deflation",
                        "hyperinflation",
                        "inflation expectations",
                        "stagflation",
                        "headline inflation",
                        "core inflation",
                    ],
                ),
                TopicDefinition::new(
                    "unemployment",
                    &[
                        "unemployment",
                        "job",
                        "job growth",
                        "labor market",
                        "labor",
                        "wages",
                        "employment",
                        "jobless",
                        "hiring",
                        "underemployment",
                        "workforce",
                        "layoffs",
                    ],
                ),
                TopicDefinition::new(
                    "interest_rates",
                    &[
                        "interest rate",
                        "fed rates",
                        "fed raises",
                        "fed hikes",
                        "fed cuts",
                        "raises rates",
                        "cuts rates",
                        "federal reserve",
                        "fedral open market committee",
                        "federal open market committee",
                        "monetary",
                        "monetary policy",
                        "fomc",
                        "rate hike",
                        "rate cut",
                        "quantitative easing",
                        "qe",
                        "quantitative tightening",
                        "yield curve",
                        "ffr",
                        "federal funds rate",
                    ],
                ),
                TopicDefinition::new(
                    "economic_growth",
                    &[
                        "gdp",
                        "domestic product",
                        "gnp",
                        "gross national product",
                        "economic expansion",
                        "recession",
                        "growth",
                        "economic slowdown",
                        "stagnation",
                        "boom and bust cycle",
                        "business cycle",
                        "productivity",
                        "economic indicators",
                    ],
                ),
                TopicDefinition::new("housing", &["mortgage", "housing", "home construction"]),
            ],
        }
    }

    /// Assign a topic to `text`; `"other"` when nothing matches.
    pub fn classify(&self, text: &str) -> &str {
        let text_lower = text.to_lowercase();
        self.topics
            .iter()
            .find(|t| t.matches(&text_lower))
            .map(|t| t.name.as_str())
            .unwrap_or(OTHER_TOPIC)
    }

    /// Topics in classification order
    pub fn topics(&self) -> &[TopicDefinition] {
        &self.topics
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::macro_default()
    }
}
