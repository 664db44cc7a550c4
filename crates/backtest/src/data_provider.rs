use crate::error::{BacktestError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use newsalpha_core::{normalize_ticker, DailyFeatureRow, PricePoint};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of per-ticker closing prices.
pub trait PriceSource {
    /// Loads the price series for `ticker`, sorted ascending and deduplicated
    /// by date.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::MissingData`] if no usable price data exists.
    fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>>;
}

/// Price cache directory with one `<ticker>.csv` file per instrument.
#[derive(Debug, Clone)]
pub struct CsvPriceCache {
    dir: PathBuf,
}

impl CsvPriceCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", normalize_ticker(ticker)))
    }
}

impl PriceSource for CsvPriceCache {
    fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(BacktestError::missing_data(
                ticker,
                format!("missing price cache {}", path.display()),
            ));
        }
        let prices = read_price_csv(ticker, &path)?;
        debug!("Loaded {} price rows for {} from {}", prices.len(), ticker, path.display());
        Ok(prices)
    }
}

/// In-memory price source keyed by lowercase ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrices {
    series: HashMap<String, Vec<PricePoint>>,
}

impl InMemoryPrices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a ticker's series; the series is normalized the
    /// same way as a CSV cache.
    #[must_use]
    pub fn with_series(mut self, ticker: &str, prices: Vec<PricePoint>) -> Self {
        self.series.insert(normalize_ticker(ticker), normalize_series(prices));
        self
    }
}

impl PriceSource for InMemoryPrices {
    fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        self.series
            .get(&normalize_ticker(ticker))
            .cloned()
            .ok_or_else(|| BacktestError::missing_data(ticker, "no price series registered"))
    }
}

/// Parses a calendar date from a price or news timestamp, keeping only the
/// date part.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Sorts ascending by date, drops non-finite closes, and keeps the first
/// row of any repeated date.
fn normalize_series(mut prices: Vec<PricePoint>) -> Vec<PricePoint> {
    prices.retain(|p| p.close.is_finite());
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);
    prices
}

fn column_index(headers: &csv::ByteRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| std::str::from_utf8(h).is_ok_and(|h| h.trim().eq_ignore_ascii_case(name)))
}

fn utf8_field<'a>(record: &'a csv::ByteRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).and_then(|f| std::str::from_utf8(f).ok())
}

/// Reads a Stooq-style daily price CSV (`Date,Open,High,Low,Close,Volume`).
///
/// Only `Date` and `Close` are required. Rows with an unparseable date or
/// close are dropped, including fields that are not valid UTF-8.
///
/// # Errors
///
/// Returns [`BacktestError::MissingData`] if either required column is absent,
/// or a CSV error if the file cannot be read.
pub fn read_price_csv(ticker: &str, path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.byte_headers()?.clone();

    let (Some(date_idx), Some(close_idx)) =
        (column_index(&headers, "date"), column_index(&headers, "close"))
    else {
        let columns: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        return Err(BacktestError::missing_data(
            ticker,
            format!("unexpected price columns {columns:?}"),
        ));
    };

    let mut prices = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let date = utf8_field(&record, date_idx).and_then(parse_calendar_date);
        let close = utf8_field(&record, close_idx).and_then(|c| c.trim().parse::<f64>().ok());
        if let (Some(date), Some(close)) = (date, close) {
            prices.push(PricePoint::new(date, close));
        }
    }

    Ok(normalize_series(prices))
}

/// Loads the long-form daily feature table, lowercasing every ticker.
///
/// # Errors
///
/// Returns [`BacktestError::Config`] if the file does not exist, or a CSV
/// error if a row does not match the feature schema.
pub fn load_feature_table(path: &Path) -> Result<Vec<DailyFeatureRow>> {
    if !path.exists() {
        return Err(BacktestError::Config(format!(
            "feature table not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<DailyFeatureRow>() {
        let mut row = result?;
        row.ticker = normalize_ticker(&row.ticker);
        rows.push(row);
    }

    debug!("Loaded {} feature rows from {}", rows.len(), path.display());
    Ok(rows)
}
