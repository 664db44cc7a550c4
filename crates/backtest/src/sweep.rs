//! Parallel parameter sweep over the strategy simulator.
//!
//! Expands a [`SweepGrid`] into its Cartesian product, simulates every
//! combination independently on the shared merged table via rayon, and
//! returns one [`SweepRow`] per combination in grid-iteration order.

use crate::simulator::simulate;
use newsalpha_core::{MergedRow, StrategyParams, SweepGrid, SweepRow};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::info;

/// Simulates one parameter combination and summarizes it.
///
/// A combination without trading days yields zero trades, Sharpe, drawdown
/// and total return.
#[must_use]
pub fn sweep_combination(rows: &[MergedRow], params: &StrategyParams) -> SweepRow {
    let result = simulate(rows, params);
    SweepRow {
        sent_thresh: params.sent_thresh,
        vol_thresh: params.vol_thresh,
        min_docs: params.min_docs,
        slippage_bps: params.slippage_bps,
        trades: result.n_trades,
        sharpe_ann: result.sharpe_annual,
        max_drawdown: result.max_drawdown,
        total_return: result.total_return,
    }
}

/// Runs every combination of `grid` against `rows`.
///
/// Combinations are evaluated in parallel; the output order matches
/// [`SweepGrid::combinations`].
#[must_use]
pub fn run_sweep(rows: &[MergedRow], grid: &SweepGrid) -> Vec<SweepRow> {
    let combos = grid.combinations();
    info!(
        "Sweeping {} parameter combinations over {} rows",
        combos.len(),
        rows.len()
    );

    combos
        .par_iter()
        .map(|params| sweep_combination(rows, params))
        .collect()
}

/// Best configurations ranked by trade count, then total return (both
/// descending).
#[must_use]
pub fn top_configs(rows: &[SweepRow], n: usize) -> Vec<SweepRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| {
        b.trades
            .cmp(&a.trades)
            .then_with(|| b.total_return.partial_cmp(&a.total_return).unwrap_or(Ordering::Equal))
    });
    ranked.truncate(n);
    ranked
}

/// Inclusive (min, max) trade count across the sweep, if any rows exist.
#[must_use]
pub fn trades_range(rows: &[SweepRow]) -> Option<(usize, usize)> {
    let min = rows.iter().map(|r| r.trades).min()?;
    let max = rows.iter().map(|r| r.trades).max()?;
    Some((min, max))
}
