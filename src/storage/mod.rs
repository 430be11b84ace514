//! Output persistence
//!
//! The aggregated table goes to a CSV file (always) and optionally to a SQLite
//! database. Both are replaced on every run, never appended to.


use crate::error::{PipelineError, Result};
use crate::types::AggregateRow;
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// Write the aggregated rows as `topic,date,mean_sentiment`.
///
/// Rows go to a sibling temp file that is renamed over `path`, so a failed
/// write never leaves a truncated output behind.
pub fn write_csv<P: AsRef<Path>>(rows: &[AggregateRow], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let written = (|| -> Result<()> {
        let mut writer = csv::Writer::from_path(&tmp)?;
        // header written explicitly so an empty table still has it
        writer.write_record(["topic", "date", "mean_sentiment"])?;
        for row in rows {
            writer.write_record([
                row.topic.clone(),
                row.date.format("%Y-%m-%d").to_string(),
                format_mean(row.mean_sentiment),
            ])?;
        }
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Always includes a decimal point so the column reads as floating point
fn format_mean(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') || s.contains('e') || !value.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

/// SQLite mirror of the aggregated table
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite database (creates if not exists)
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", path.as_ref().display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topic_sentiment (
                topic TEXT NOT NULL,
                date TEXT NOT NULL,
                mean_sentiment REAL NOT NULL,
                PRIMARY KEY (topic, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the table contents with `rows` in one transaction
    pub async fn replace_rows(&self, rows: &[AggregateRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM topic_sentiment")
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO topic_sentiment (topic, date, mean_sentiment)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&row.topic)
            .bind(row.date.format("%Y-%m-%d").to_string())
            .bind(row.mean_sentiment)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// All stored rows ordered by (topic, date)
    pub async fn load_rows(&self) -> Result<Vec<AggregateRow>> {
        let rows = sqlx::query_as::<_, SentimentRow>(
            r#"
            SELECT topic, date, mean_sentiment
            FROM topic_sentiment
            ORDER BY topic, date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AggregateRow::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SentimentRow {
    topic: String,
    date: String,
    mean_sentiment: f64,
}

impl TryFrom<SentimentRow> for AggregateRow {
    type Error = PipelineError;

    fn try_from(row: SentimentRow) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|e| PipelineError::Internal(format!("bad stored date {:?}: {}", row.date, e)))?;
        Ok(AggregateRow {
            topic: row.topic,
            date,
            mean_sentiment: row.mean_sentiment,
        })
    }
}
