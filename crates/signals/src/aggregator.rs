//! Daily sentiment feature aggregation.
//!
//! Collapses scored news items into one [`DailyFeatureRow`] per
//! (ticker, day) and attaches a `volume_z` burst score: the z-score of the
//! day's document count against a trailing window of the same ticker's
//! daily counts (current day included).
//!
//! # Example
//!
//! ```
//! use newsalpha_signals::{aggregate_daily, ScoredItem};
//!
//! let item = |seen: &str, compound: f64| ScoredItem {
//!     ticker: "AAPL.US".to_string(),
//!     seendate: seen.to_string(),
//!     title: String::new(),
//!     compound,
//!     pos: 0.0,
//!     neu: 1.0,
//!     neg: 0.0,
//! };
//!
//! let rows = aggregate_daily(&[item("20240102090000", 0.2), item("2024-01-02 17:00:00", 0.4)]);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].ticker, "aapl.us");
//! assert_eq!(rows[0].docs, 2);
//! ```

use crate::scored_item::{load_scored_items, ScoredItem};
use anyhow::{Context, Result};
use newsalpha_core::{normalize_ticker, DailyFeatureRow};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Trailing window (in ticker-days) for the burst score.
pub const VOLUME_Z_WINDOW: usize = 5;

/// Fewest ticker-days in the window before a burst score is defined.
pub const VOLUME_Z_MIN_PERIODS: usize = 2;

const FEATURE_COLUMNS: &[&str] = &[
    "ticker",
    "date",
    "docs",
    "avg_compound",
    "pos_frac",
    "neg_frac",
    "volume_z",
];

/// Outcome of a feature build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureBuildSummary {
    pub rows: usize,
    pub unique_days: usize,
}

impl FeatureBuildSummary {
    #[must_use]
    pub fn from_rows(rows: &[DailyFeatureRow]) -> Self {
        let days: BTreeSet<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        Self {
            rows: rows.len(),
            unique_days: days.len(),
        }
    }
}

#[derive(Debug, Default)]
struct DayAccumulator {
    docs: u32,
    compound: f64,
    pos: f64,
    neg: f64,
}

impl DayAccumulator {
    fn add(&mut self, item: &ScoredItem) {
        self.docs += 1;
        self.compound += item.compound;
        self.pos += item.pos;
        self.neg += item.neg;
    }

    fn into_row(self, ticker: String, date: String) -> DailyFeatureRow {
        let n = f64::from(self.docs);
        DailyFeatureRow {
            ticker,
            date,
            docs: self.docs,
            avg_compound: self.compound / n,
            pos_frac: self.pos / n,
            neg_frac: self.neg / n,
            volume_z: 0.0,
        }
    }
}

/// Groups scored items into daily feature rows ordered by ticker, then date.
///
/// Items whose seen-date cannot be parsed, or whose ticker is blank, are
/// skipped.
#[must_use]
pub fn aggregate_daily(items: &[ScoredItem]) -> Vec<DailyFeatureRow> {
    let mut groups: BTreeMap<(String, String), DayAccumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for item in items {
        let ticker = normalize_ticker(&item.ticker);
        let Some(day) = item.day().filter(|_| !ticker.is_empty()) else {
            skipped += 1;
            continue;
        };
        groups.entry((ticker, day)).or_default().add(item);
    }

    if skipped > 0 {
        debug!("Skipped {} items without a usable ticker or seen-date", skipped);
    }

    let mut rows: Vec<DailyFeatureRow> = groups
        .into_iter()
        .map(|((ticker, date), acc)| acc.into_row(ticker, date))
        .collect();

    // Rows are already contiguous per ticker and date-ascending within it.
    let mut start = 0;
    while start < rows.len() {
        let end = rows[start..]
            .iter()
            .position(|r| r.ticker != rows[start].ticker)
            .map_or(rows.len(), |offset| start + offset);

        let docs: Vec<u32> = rows[start..end].iter().map(|r| r.docs).collect();
        for (row, z) in rows[start..end].iter_mut().zip(rolling_volume_z(&docs)) {
            row.volume_z = z;
        }
        start = end;
    }

    rows
}

/// Burst score for each entry of a ticker's date-ordered daily counts.
///
/// Uses the trailing [`VOLUME_Z_WINDOW`] counts including the current one
/// and the population standard deviation. Entries with fewer than
/// [`VOLUME_Z_MIN_PERIODS`] counts in the window, or a zero deviation,
/// score 0.0.
#[must_use]
pub fn rolling_volume_z(docs: &[u32]) -> Vec<f64> {
    (0..docs.len())
        .map(|i| {
            let window = &docs[(i + 1).saturating_sub(VOLUME_Z_WINDOW)..=i];
            if window.len() < VOLUME_Z_MIN_PERIODS {
                return 0.0;
            }

            #[allow(clippy::cast_precision_loss)]
            let n = window.len() as f64;
            let mean = window.iter().map(|&d| f64::from(d)).sum::<f64>() / n;
            let variance = window
                .iter()
                .map(|&d| (f64::from(d) - mean).powi(2))
                .sum::<f64>()
                / n;
            let std_dev = variance.sqrt();

            if std_dev > 0.0 {
                (f64::from(docs[i]) - mean) / std_dev
            } else {
                0.0
            }
        })
        .collect()
}

/// Writes the feature table CSV, creating parent directories. An empty table
/// still gets its header line.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_feature_table(path: &Path, rows: &[DailyFeatureRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(FEATURE_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Loads scored items, aggregates them and writes the feature table.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written.
pub fn build_feature_table(scored_path: &Path, out_path: &Path) -> Result<FeatureBuildSummary> {
    let items = load_scored_items(scored_path)?;
    if items.is_empty() {
        warn!("No scored items in {}", scored_path.display());
    }

    let rows = aggregate_daily(&items);
    write_feature_table(out_path, &rows)?;

    let summary = FeatureBuildSummary::from_rows(&rows);
    info!(
        "Wrote {} feature rows ({} unique days) to {}",
        summary.rows,
        summary.unique_days,
        out_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================
    // Helper Functions
    // ============================================

    fn item(ticker: &str, seen: &str, compound: f64, pos: f64, neg: f64) -> ScoredItem {
        ScoredItem {
            ticker: ticker.to_string(),
            seendate: seen.to_string(),
            title: "headline".to_string(),
            compound,
            pos,
            neu: 1.0 - pos - neg,
            neg,
        }
    }

    // ============================================
    // Aggregation
    // ============================================

    #[test]
    fn groups_by_ticker_and_day_with_means() {
        let items = vec![
            item("AAPL.US", "20240102090000", 0.2, 0.4, 0.0),
            item("aapl.us", "2024-01-02 17:00:00", 0.4, 0.2, 0.2),
            item("AAPL.US", "20240103090000", -0.5, 0.0, 0.5),
        ];

        let rows = aggregate_daily(&items);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-01-02");
        assert_eq!(rows[0].docs, 2);
        assert!((rows[0].avg_compound - 0.3).abs() < 1e-12);
        assert!((rows[0].pos_frac - 0.3).abs() < 1e-12);
        assert!((rows[0].neg_frac - 0.1).abs() < 1e-12);
        assert_eq!(rows[1].docs, 1);
    }

    #[test]
    fn output_is_ordered_by_ticker_then_date() {
        let items = vec![
            item("msft.us", "2024-01-03", 0.1, 0.0, 0.0),
            item("aapl.us", "2024-01-04", 0.1, 0.0, 0.0),
            item("msft.us", "2024-01-02", 0.1, 0.0, 0.0),
            item("aapl.us", "2024-01-02", 0.1, 0.0, 0.0),
        ];

        let keys: Vec<(String, String)> = aggregate_daily(&items)
            .into_iter()
            .map(|r| (r.ticker, r.date))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("aapl.us".to_string(), "2024-01-02".to_string()),
                ("aapl.us".to_string(), "2024-01-04".to_string()),
                ("msft.us".to_string(), "2024-01-02".to_string()),
                ("msft.us".to_string(), "2024-01-03".to_string()),
            ]
        );
    }

    #[test]
    fn unparseable_dates_and_blank_tickers_are_skipped() {
        let items = vec![
            item("aapl.us", "garbage", 0.9, 0.0, 0.0),
            item("  ", "2024-01-02", 0.9, 0.0, 0.0),
            item("aapl.us", "2024-01-02", 0.1, 0.0, 0.0),
        ];

        let rows = aggregate_daily(&items);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].docs, 1);
        assert!((rows[0].avg_compound - 0.1).abs() < 1e-12);
    }

    // ============================================
    // Burst Score
    // ============================================

    #[test]
    fn volume_z_needs_two_periods() {
        assert_eq!(rolling_volume_z(&[]), Vec::<f64>::new());
        assert_eq!(rolling_volume_z(&[7]), vec![0.0]);
    }

    #[test]
    fn volume_z_uses_population_std_over_trailing_window() {
        let z = rolling_volume_z(&[1, 3]);
        // window [1, 3]: mean 2, population std 1
        assert_eq!(z[0], 0.0);
        assert!((z[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn volume_z_window_drops_old_counts() {
        let z = rolling_volume_z(&[100, 1, 1, 1, 1, 1]);
        // last window is five ones: zero deviation
        assert_eq!(z[5], 0.0);
        assert!(z[4] < 0.0);
    }

    #[test]
    fn volume_z_is_computed_per_ticker() {
        let mut items = Vec::new();
        for _ in 0..3 {
            items.push(item("aapl.us", "2024-01-02", 0.0, 0.0, 0.0));
        }
        items.push(item("aapl.us", "2024-01-03", 0.0, 0.0, 0.0));
        items.push(item("msft.us", "2024-01-02", 0.0, 0.0, 0.0));

        let rows = aggregate_daily(&items);

        // aapl docs [3, 1]: mean 2, std 1
        assert!((rows[0].volume_z - 0.0).abs() < 1e-12);
        assert!((rows[1].volume_z + 1.0).abs() < 1e-12);
        assert_eq!(rows[2].volume_z, 0.0);
    }

    // ============================================
    // Persistence
    // ============================================

    #[test]
    fn build_writes_feature_csv_and_summary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scored = dir.path().join("scored.csv");
        let out = dir.path().join("processed/features.csv");
        fs::write(
            &scored,
            "ticker,seendate,title,compound,pos,neu,neg\n\
             AAPL.US,20240102090000,up,0.5,0.4,0.6,0.0\n\
             MSFT.US,20240102090000,flat,0.0,0.0,1.0,0.0\n\
             MSFT.US,20240103090000,down,-0.5,0.0,0.6,0.4\n",
        )
        .expect("write");

        let summary = build_feature_table(&scored, &out).expect("build");

        assert_eq!(summary, FeatureBuildSummary { rows: 3, unique_days: 2 });
        let text = fs::read_to_string(&out).expect("read");
        assert!(text.starts_with("ticker,date,docs,avg_compound,pos_frac,neg_frac,volume_z"));
        assert!(text.contains("aapl.us,2024-01-02,1,0.5,0.4,0.0,0.0"));
    }

    #[test]
    fn build_keeps_valid_tickers_when_one_record_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scored = dir.path().join("scored.csv");
        let out = dir.path().join("features.csv");
        fs::write(
            &scored,
            "ticker,seendate,title,compound,pos,neu,neg\n\
             AAPL.US,20240102090000,up,0.5,0.4,0.6,0.0\n\
             MSFT.US,20240102090000,broken,n/a,0.0,1.0,0.0\n\
             AAPL.US,20240103090000,up,0.3,0.3,0.7,0.0\n",
        )
        .expect("write");

        let summary = build_feature_table(&scored, &out).expect("build");

        assert_eq!(summary, FeatureBuildSummary { rows: 2, unique_days: 2 });
        let text = fs::read_to_string(&out).expect("read");
        assert!(text.contains("aapl.us,2024-01-02,1,0.5,0.4,0.0,0.0"));
        assert!(!text.contains("msft.us"));
    }

    #[test]
    fn empty_feature_table_keeps_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("features.csv");

        write_feature_table(&out, &[]).expect("write");

        assert_eq!(
            fs::read_to_string(&out).expect("read").trim(),
            FEATURE_COLUMNS.join(",")
        );
    }
}
