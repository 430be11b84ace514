//! Dataset ingestion
//!
//! A [`DatasetSource`] produces a [`RawTable`]: named columns of string cells.
//! The pipeline only needs two of them (post text and creation timestamp) and
//! turns the table into [`Record`]s once both are known to exist.

pub mod source;


pub use source::CsvSource;

use crate::error::{PipelineError, Result};
use async_trait::async_trait;

/// One input post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Source line (1-based, header is line 1) for diagnostics
    pub line: usize,
    /// Post text, empty when the cell is missing
    pub text: String,
    /// Raw creation timestamp; may be unparseable
    pub created_at: String,
}

/// Tabular dataset as loaded, before any column checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Each row paired with its source line
    pub rows: Vec<(usize, Vec<String>)>,
    /// Rows that could not be decoded
    pub skipped_rows: usize,
}

/// Positions of the two required columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumns {
    pub text: usize,
    pub created_at: usize,
}

impl RawTable {
    /// Build from headers and rows; lines are numbered from 2.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows: rows.into_iter().enumerate().map(|(i, r)| (i + 2, r)).collect(),
            skipped_rows: 0,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Resolve the required columns, failing on the first one missing.
    pub fn require_columns(&self, text: &str, created_at: &str) -> Result<RequiredColumns> {
        let text = self
            .column_index(text)
            .ok_or_else(|| PipelineError::MissingColumn(text.to_string()))?;
        let created_at = self
            .column_index(created_at)
            .ok_or_else(|| PipelineError::MissingColumn(created_at.to_string()))?;
        Ok(RequiredColumns { text, created_at })
    }

    /// Project rows onto records. Missing cells become empty strings.
    pub fn into_records(self, columns: RequiredColumns) -> Vec<Record> {
        self.rows
            .into_iter()
            .map(|(line, row)| Record {
                line,
                text: row.get(columns.text).cloned().unwrap_or_default(),
                created_at: row.get(columns.created_at).cloned().unwrap_or_default(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Dataset source trait
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Source name
    fn name(&self) -> &str;

    /// Load the full dataset
    async fn load(&self) -> Result<RawTable>;
}

/// Already-materialized table, used for embedding and tests
pub struct InMemorySource {
    table: RawTable,
}

impl InMemorySource {
    pub fn new(table: RawTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl DatasetSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }
}
