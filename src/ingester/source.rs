//! CSV dataset source

use super::{DatasetSource, RawTable};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads a headered CSV file
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Parse CSV from any reader.
///
/// Cells are decoded lossily, so invalid UTF-8 becomes U+FFFD and the row is
/// kept. Rows the CSV parser itself rejects are logged and skipped.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| PipelineError::Input(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(|h| decode_cell(h).trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut table = RawTable {
        headers,
        ..RawTable::default()
    };

    for (idx, result) in reader.byte_records().enumerate() {
        // byte_records() starts after the header, lines are 1-based
        let line = result
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        match result {
            Ok(record) => table
                .rows
                .push((line, record.iter().map(decode_cell).collect())),
            Err(e) => {
                tracing::warn!("Skipping malformed CSV row near line {}: {}", line, e);
                table.skipped_rows += 1;
            }
        }
    }

    Ok(table)
}

fn decode_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[async_trait]
impl DatasetSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn load(&self) -> Result<RawTable> {
        let path = self.path.clone();
        let file = std::fs::File::open(&path).map_err(|e| {
            PipelineError::Input(format!("Failed to open CSV '{}': {}", path.display(), e))
        })?;

        let table = tokio::task::spawn_blocking(move || read_table(file))
            .await
            .map_err(|e| PipelineError::Internal(format!("CSV reader task failed: {}", e)))??;

        tracing::info!(
            "Loaded {} rows from {} ({} skipped)",
            table.len(),
            self.path.display(),
            table.skipped_rows
        );
        Ok(table)
    }
}
