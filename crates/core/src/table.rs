//! Row types exchanged between pipeline stages.
//!
//! Every table in the pipeline is a `Vec` of one of these rows. Field names
//! double as CSV column names, so the structs stay flat (the `csv` crate does
//! not support flattened serde structs).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowercases and trims a ticker so joins are case-insensitive.
#[must_use]
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_lowercase()
}

/// One closing price from a ticker's price cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    #[must_use]
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// ISO calendar date used as the join key.
    #[must_use]
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Forward returns for one trading day of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturnRow {
    pub date: String,
    pub fwd_ret_1d: Option<f64>,
    pub fwd_ret_3d: Option<f64>,
}

/// Aggregated news sentiment for one ticker-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeatureRow {
    pub ticker: String,
    pub date: String,
    pub docs: u32,
    pub avg_compound: f64,
    pub pos_frac: f64,
    pub neg_frac: f64,
    pub volume_z: f64,
}

/// A feature row left-joined with the forward returns of the same ticker-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub ticker: String,
    pub date: String,
    pub docs: u32,
    pub avg_compound: f64,
    pub pos_frac: f64,
    pub neg_frac: f64,
    pub volume_z: f64,
    pub fwd_ret_1d: Option<f64>,
    pub fwd_ret_3d: Option<f64>,
}

impl MergedRow {
    /// Joins a feature row with its forward returns, if any were found.
    #[must_use]
    pub fn from_parts(feature: DailyFeatureRow, returns: Option<&ForwardReturnRow>) -> Self {
        Self {
            ticker: feature.ticker,
            date: feature.date,
            docs: feature.docs,
            avg_compound: feature.avg_compound,
            pos_frac: feature.pos_frac,
            neg_frac: feature.neg_frac,
            volume_z: feature.volume_z,
            fwd_ret_1d: returns.and_then(|r| r.fwd_ret_1d),
            fwd_ret_3d: returns.and_then(|r| r.fwd_ret_3d),
        }
    }
}

/// Equal-weight portfolio outcome for one date with at least one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDay {
    pub date: String,
    pub portfolio_ret: f64,
    pub n_positions: usize,
    pub equity: f64,
}

/// Simulation summary for one parameter combination of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub sent_thresh: f64,
    pub vol_thresh: f64,
    pub min_docs: u32,
    pub slippage_bps: f64,
    pub trades: usize,
    pub sharpe_ann: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(date: &str) -> DailyFeatureRow {
        DailyFeatureRow {
            ticker: "aapl.us".to_string(),
            date: date.to_string(),
            docs: 12,
            avg_compound: 0.1,
            pos_frac: 0.2,
            neg_frac: 0.05,
            volume_z: 1.5,
        }
    }

    #[test]
    fn normalize_ticker_lowercases_and_trims() {
        assert_eq!(normalize_ticker(" AAPL.US "), "aapl.us");
    }

    #[test]
    fn price_point_date_key_is_iso() {
        let point = PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"), 100.0);
        assert_eq!(point.date_key(), "2024-01-02");
    }

    #[test]
    fn merged_row_without_returns_keeps_nulls() {
        let row = MergedRow::from_parts(feature("2024-01-02"), None);

        assert_eq!(row.fwd_ret_1d, None);
        assert_eq!(row.fwd_ret_3d, None);
        assert_eq!(row.docs, 12);
    }

    #[test]
    fn merged_row_copies_returns() {
        let returns = ForwardReturnRow {
            date: "2024-01-02".to_string(),
            fwd_ret_1d: Some(0.02),
            fwd_ret_3d: None,
        };

        let row = MergedRow::from_parts(feature("2024-01-02"), Some(&returns));

        assert_eq!(row.fwd_ret_1d, Some(0.02));
        assert_eq!(row.fwd_ret_3d, None);
    }
}
