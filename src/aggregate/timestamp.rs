//! Tolerant timestamp parsing
//!
//! Accepts the formats that show up in scraped post exports and returns the
//! UTC calendar date. Anything else yields `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Offset-aware formats beyond RFC 3339 / RFC 2822
const OFFSET_FORMATS: &[&str] = &[
    // Twitter API v1.1: "Fri Jan 05 10:00:00 +0000 2024"
    "%a %b %d %H:%M:%S %z %Y",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Naive date-time formats, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Values above this are epoch milliseconds rather than seconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const MIN_EPOCH_DIGITS: usize = 9;

/// Parse a raw timestamp into its UTC calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }
    let naive = strip_utc_suffix(s);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    parse_epoch(s)
}

/// Drop a trailing ` UTC` or `Z` so the rest parses as a naive UTC time
fn strip_utc_suffix(s: &str) -> &str {
    s.strip_suffix(" UTC")
        .or_else(|| s.strip_suffix("UTC"))
        .or_else(|| s.strip_suffix('Z'))
        .map(str::trim_end)
        .unwrap_or(s)
}

fn parse_epoch(s: &str) -> Option<NaiveDate> {
    // short digit runs are more likely years or ids than epochs
    if s.len() < MIN_EPOCH_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = s.parse().ok()?;
    let dt = if value >= EPOCH_MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(value)?
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)?
    };
    Some(dt.date_naive())
}
