//! Forward returns over a trading-day price sequence.
//!
//! Offsets are positional: `fwd_ret_kd` at row `i` compares the close at row
//! `i + k` with the close at row `i`, so weekends and holidays are skipped
//! naturally because they have no rows.

use newsalpha_core::{ForwardReturnRow, PricePoint};

/// Computes `close[i + horizon] / close[i] - 1` for every row.
///
/// The final `horizon` rows have no forward return. Non-finite ratios (a zero
/// close, for instance) are also reported as missing rather than as a number.
#[must_use]
pub fn forward_returns(closes: &[f64], horizon: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            let future = closes.get(i + horizon)?;
            let ret = future / closes[i] - 1.0;
            ret.is_finite().then_some(ret)
        })
        .collect()
}

/// Builds the 1-day and 3-day forward return table for one instrument.
///
/// `prices` must already be sorted ascending and deduplicated by date.
#[must_use]
pub fn compute_forward_returns(prices: &[PricePoint]) -> Vec<ForwardReturnRow> {
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let ret_1d = forward_returns(&closes, 1);
    let ret_3d = forward_returns(&closes, 3);

    prices
        .iter()
        .zip(ret_1d.into_iter().zip(ret_3d))
        .map(|(point, (fwd_ret_1d, fwd_ret_3d))| ForwardReturnRow {
            date: point.date_key(),
            fwd_ret_1d,
            fwd_ret_3d,
        })
        .collect()
}
