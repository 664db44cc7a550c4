//! Scored news items as produced by the external sentiment scorer.
//!
//! Each item carries the ticker it was fetched for, the raw "seen" timestamp
//! reported by the news source, and VADER-style polarity scores. The seen
//! timestamp arrives in several layouts depending on the source, so
//! [`parse_seen_date`] reduces it to a calendar day.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Timestamp layouts tried after the compact 14-digit form.
const SEEN_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y%m%dT%H%M%SZ",
];

/// One news headline with its sentiment scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub ticker: String,
    /// Raw timestamp string from the news source
    pub seendate: String,
    #[serde(default)]
    pub title: String,
    /// Compound polarity in [-1, 1]
    pub compound: f64,
    pub pos: f64,
    #[serde(default)]
    pub neu: f64,
    pub neg: f64,
}

impl ScoredItem {
    /// Calendar day (`YYYY-MM-DD`) the item was seen, if its timestamp parses.
    #[must_use]
    pub fn day(&self) -> Option<String> {
        parse_seen_date(&self.seendate)
    }
}

/// Reduces a raw seen-date to `YYYY-MM-DD`.
///
/// Accepts the compact `YYYYMMDDHHMMSS` form, `YYYY-MM-DD HH:MM:SS[.f]`,
/// RFC 3339, the compact `YYYYMMDDTHHMMSSZ` form and a bare `YYYY-MM-DD`.
/// Offsets are not converted: the day is the one written in the timestamp.
/// Returns `None` for anything else, including empty input.
///
/// # Example
///
/// ```
/// use newsalpha_signals::parse_seen_date;
///
/// assert_eq!(parse_seen_date("20240102153000").as_deref(), Some("2024-01-02"));
/// assert_eq!(parse_seen_date("yesterday"), None);
/// ```
#[must_use]
pub fn parse_seen_date(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    seen_day(s).map(|day| day.format("%Y-%m-%d").to_string())
}

fn seen_day(s: &str) -> Option<NaiveDate> {
    if s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S") {
            return Some(dt.date());
        }
    }

    for fmt in SEEN_DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Loads scored items from a CSV with columns
/// `ticker,seendate,title,compound,pos,neu,neg` (`title` and `neu` optional).
///
/// Records that do not match the schema (for example an empty score) are
/// logged with their ticker and skipped; the remaining items are returned.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be read.
pub fn load_scored_items(path: &Path) -> Result<Vec<ScoredItem>> {
    if !path.exists() {
        bail!("Scored news file not found: {}", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader
        .byte_headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();
    let ticker_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(b"ticker"));

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.byte_records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read record {} of {}", line + 1, path.display()))?;
        match record.deserialize::<ScoredItem>(Some(&headers)) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                let ticker = ticker_idx
                    .and_then(|idx| record.get(idx))
                    .map_or_else(|| "?".into(), String::from_utf8_lossy);
                warn!("- {}: skipping malformed scored item at record {}: {}", ticker, line + 1, e);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed scored items in {}", skipped, path.display());
    }
    debug!("Loaded {} scored items from {}", items.len(), path.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // ============================================
    // Seen-date Parsing
    // ============================================

    #[test]
    fn parses_compact_timestamp() {
        assert_eq!(parse_seen_date("20240102153000").as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn parses_spaced_timestamps_with_and_without_fraction() {
        assert_eq!(
            parse_seen_date("2024-01-02 15:30:00.123456").as_deref(),
            Some("2024-01-02")
        );
        assert_eq!(parse_seen_date("2024-01-02 15:30:00").as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn parses_iso_and_gdelt_layouts() {
        assert_eq!(parse_seen_date("2024-01-02T23:30:00Z").as_deref(), Some("2024-01-02"));
        assert_eq!(
            parse_seen_date("2024-01-02T23:30:00-05:00").as_deref(),
            Some("2024-01-02")
        );
        assert_eq!(parse_seen_date("20240102T153000Z").as_deref(), Some("2024-01-02"));
        assert_eq!(parse_seen_date(" 2024-01-02 ").as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn rejects_unparseable_input() {
        assert_eq!(parse_seen_date(""), None);
        assert_eq!(parse_seen_date("   "), None);
        assert_eq!(parse_seen_date("not a date"), None);
        assert_eq!(parse_seen_date("20241399000000"), None);
    }

    // ============================================
    // CSV Loading
    // ============================================

    #[test]
    fn loads_items_with_optional_columns_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scored.csv");
        fs::write(
            &path,
            "ticker,seendate,compound,pos,neg\nAAPL.US,20240102153000,0.5,0.3,0.1\n",
        )
        .expect("write");

        let items = load_scored_items(&path).expect("load");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ticker, "AAPL.US");
        assert_eq!(items[0].title, "");
        assert_eq!(items[0].neu, 0.0);
        assert_eq!(items[0].day().as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn malformed_record_is_skipped_without_losing_other_tickers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scored.csv");
        fs::write(
            &path,
            "ticker,seendate,title,compound,pos,neu,neg\n\
             AAPL.US,20240102090000,up,0.5,0.4,0.6,0.0\n\
             MSFT.US,20240102090000,blank,,0.0,1.0,0.0\n\
             AAPL.US,20240103090000,up,0.3,0.3,0.7,0.0\n",
        )
        .expect("write");

        let items = load_scored_items(&path).expect("load");

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.ticker == "AAPL.US"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_scored_items(Path::new("no/such/scored.csv")).expect_err("must fail");
        assert!(err.to_string().contains("not found"));
    }
}
