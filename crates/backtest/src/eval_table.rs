//! Merges daily sentiment features with forward returns.

use crate::data_provider::PriceSource;
use crate::error::{BacktestError, Result};
use crate::returns::compute_forward_returns;
use newsalpha_core::{normalize_ticker, DailyFeatureRow, ForwardReturnRow, MergedRow};
use std::collections::HashMap;
use tracing::{debug, info};

/// Builds the evaluation table for the requested tickers.
///
/// For each ticker (in request order) the feature rows are filtered
/// case-insensitively, sorted by date, and left-joined with that ticker's
/// forward returns. Tickers without feature rows are skipped silently; rows
/// whose date has no price data keep null returns.
///
/// # Errors
///
/// Returns [`BacktestError::Config`] if `features` is empty, or the error of
/// `prices` when a ticker with features has no usable price data.
pub fn build_eval_table<P: PriceSource + ?Sized>(
    tickers: &[String],
    features: &[DailyFeatureRow],
    prices: &P,
) -> Result<Vec<MergedRow>> {
    if features.is_empty() {
        return Err(BacktestError::Config(
            "daily feature table is empty; run the features stage first".to_string(),
        ));
    }

    let mut by_ticker: HashMap<String, Vec<&DailyFeatureRow>> = HashMap::new();
    for row in features {
        by_ticker
            .entry(normalize_ticker(&row.ticker))
            .or_default()
            .push(row);
    }

    let mut merged = Vec::new();
    for ticker in tickers {
        let ticker = normalize_ticker(ticker);
        let Some(rows) = by_ticker.get_mut(&ticker) else {
            debug!("No feature rows for {}, skipping", ticker);
            continue;
        };
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        let forward = compute_forward_returns(&prices.load_prices(&ticker)?);
        let by_date: HashMap<&str, &ForwardReturnRow> =
            forward.iter().map(|r| (r.date.as_str(), r)).collect();

        let before = merged.len();
        merged.extend(rows.iter().map(|&row| {
            let returns = by_date.get(row.date.as_str()).copied();
            let mut out = MergedRow::from_parts(row.clone(), returns);
            out.ticker.clone_from(&ticker);
            out
        }));
        debug!("Merged {} rows for {}", merged.len() - before, ticker);
    }

    info!(
        "Built evaluation table: {} rows across {} requested tickers",
        merged.len(),
        tickers.len()
    );
    Ok(merged)
}
