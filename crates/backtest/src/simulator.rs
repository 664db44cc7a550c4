//! Lagged equal-weight strategy simulation over a merged evaluation table.
//!
//! # Process
//!
//! 1. Assign a same-day [`Signal`] from sentiment, burst score and doc count
//! 2. Lag it one row within each ticker's date sequence (executed signal)
//! 3. P&L = executed signal × that row's `fwd_ret_1d`, minus slippage per trade
//! 4. Average net P&L across active positions per date (equal weight)
//! 5. Compound the daily portfolio returns into an equity curve
//!
//! The executed signal on day `d` is paired with the forward return stored on
//! day `d` itself. This temporal indexing is part of the backtest definition
//! and is kept as is.

use crate::metrics::MetricsCalculator;
use newsalpha_core::{MergedRow, PortfolioDay, Signal, StrategyParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Per ticker-day record of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedRow {
    pub ticker: String,
    pub date: String,
    pub signal: Signal,
    pub executed_signal: Signal,
    pub fwd_ret_1d: Option<f64>,
    pub gross_pnl: Option<f64>,
    pub net_pnl: Option<f64>,
}

impl ExecutedRow {
    /// Returns true if a position was held on this row.
    #[must_use]
    pub fn is_trade(&self) -> bool {
        self.executed_signal.is_active()
    }
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub portfolio: Vec<PortfolioDay>,
    /// Non-flat same-day signals, before the execution lag.
    pub n_signal_days: usize,
    /// Executed positions that contributed to the portfolio.
    pub n_trades: usize,
    pub sharpe_annual: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
}

impl SimulationResult {
    #[must_use]
    pub fn trading_days(&self) -> usize {
        self.portfolio.len()
    }
}

// ============================================
// Signal Assignment
// ============================================

/// Same-day signal for one row.
///
/// Long when sentiment is at least `sent_thresh`, short when it is at most
/// `-sent_thresh`; both additionally require `volume_z >= vol_thresh` and
/// `docs >= min_docs`.
#[must_use]
pub fn assign_signal(row: &MergedRow, params: &StrategyParams) -> Signal {
    let burst = row.volume_z >= params.vol_thresh && row.docs >= params.min_docs;
    if !burst {
        return Signal::Flat;
    }
    if row.avg_compound >= params.sent_thresh {
        Signal::Long
    } else if row.avg_compound <= -params.sent_thresh {
        Signal::Short
    } else {
        Signal::Flat
    }
}

/// Groups rows by lowercase ticker, each group sorted by date (stable).
fn group_by_ticker(rows: &[MergedRow]) -> BTreeMap<String, Vec<&MergedRow>> {
    let mut groups: BTreeMap<String, Vec<&MergedRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.ticker.to_lowercase()).or_default().push(row);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.date.cmp(&b.date));
    }
    groups
}

// ============================================
// Execution
// ============================================

/// Assigns signals, applies the one-row execution lag per ticker and computes
/// per-row P&L. Output is ordered by ticker, then date.
#[must_use]
pub fn execute_signals(rows: &[MergedRow], params: &StrategyParams) -> Vec<ExecutedRow> {
    let slippage = params.slippage_rate();
    let mut executed = Vec::with_capacity(rows.len());

    for (ticker, group) in group_by_ticker(rows) {
        let mut previous = Signal::Flat;
        for row in group {
            let signal = assign_signal(row, params);
            let executed_signal = previous;
            previous = signal;

            // Non-finite returns count as missing.
            let fwd_ret_1d = row.fwd_ret_1d.filter(|r| r.is_finite());
            let gross_pnl = fwd_ret_1d.map(|r| executed_signal.multiplier() * r);
            let cost = if executed_signal.is_active() { slippage } else { 0.0 };
            executed.push(ExecutedRow {
                ticker: ticker.clone(),
                date: row.date.clone(),
                signal,
                executed_signal,
                fwd_ret_1d,
                gross_pnl,
                net_pnl: gross_pnl.map(|pnl| pnl - cost),
            });
        }
    }

    executed
}

/// Equal-weight daily portfolio over executed trades with a known return.
///
/// Dates without an active position produce no row.
#[must_use]
pub fn aggregate_portfolio(executed: &[ExecutedRow]) -> Vec<PortfolioDay> {
    let mut by_date: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in executed.iter().filter(|r| r.is_trade()) {
        if let Some(net) = row.net_pnl {
            let entry = by_date.entry(row.date.as_str()).or_insert((0.0, 0));
            entry.0 += net;
            entry.1 += 1;
        }
    }

    let mut calc = MetricsCalculator::new();
    by_date
        .into_iter()
        .map(|(date, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let portfolio_ret = sum / count as f64;
            let equity = calc.add_return(portfolio_ret);
            PortfolioDay {
                date: date.to_string(),
                portfolio_ret,
                n_positions: count,
                equity,
            }
        })
        .collect()
}

/// Runs the full strategy simulation for one parameter set.
#[must_use]
pub fn simulate(rows: &[MergedRow], params: &StrategyParams) -> SimulationResult {
    let executed = execute_signals(rows, params);
    let n_signal_days = executed.iter().filter(|r| r.signal.is_active()).count();

    let portfolio = aggregate_portfolio(&executed);
    let n_trades = portfolio.iter().map(|day| day.n_positions).sum();

    let mut calc = MetricsCalculator::new();
    for day in &portfolio {
        calc.add_return(day.portfolio_ret);
    }
    let metrics = calc.calculate();

    debug!(
        "Simulated sent={} vol={} docs={} slip={}: signals={} trades={} days={}",
        params.sent_thresh,
        params.vol_thresh,
        params.min_docs,
        params.slippage_bps,
        n_signal_days,
        n_trades,
        portfolio.len()
    );

    SimulationResult {
        portfolio,
        n_signal_days,
        n_trades,
        sharpe_annual: metrics.sharpe_annual,
        max_drawdown: metrics.max_drawdown,
        total_return: metrics.total_return,
    }
}
