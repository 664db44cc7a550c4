//! Markdown reports written under the report directory.
//!
//! Each stage renders a small, diff-friendly markdown file. The latest
//! results summary stitches the headline numbers of the other stages
//! together.

use newsalpha_backtest::{top_configs, trades_range, EvalResult, SimulationResult};
use newsalpha_core::{AppConfig, StrategyParams, SweepRow};
use std::fmt::Write as _;
use std::path::Path;

pub const EVAL_REPORT: &str = "eval_results.md";
pub const BACKTEST_REPORT: &str = "backtest.md";
pub const SWEEP_REPORT: &str = "sweep.md";
pub const LATEST_REPORT: &str = "latest_results.md";

/// Rows shown in the sweep report's ranking table.
pub const SWEEP_TOP_N: usize = 10;

// ============================================
// Evaluation
// ============================================

pub fn eval_markdown(result: &EvalResult, config: &AppConfig) -> String {
    let mut md = String::new();
    md.push_str("# Signal Evaluation\n\n");
    md.push_str("What this measures:\n");
    md.push_str(
        "- **IC (Spearman, 1D):** rank correlation between daily sentiment and next-day return.\n",
    );
    let _ = writeln!(
        md,
        "- **Event study:** average forward returns on **news-burst** days (volume_z ≥ {}, docs ≥ {}).",
        config.events.min_volume_z, config.events.min_docs
    );
    let _ = writeln!(
        md,
        "- Significance from {} label permutations; {:.0}% bootstrap CIs from {} resamples (seed {}).",
        config.stats.n_permutations,
        config.stats.confidence_level * 100.0,
        config.stats.n_bootstrap,
        config.stats.seed
    );
    md.push_str("\n## Summary\n");
    let _ = writeln!(md, "- merged_rows: {}", result.merged_rows);
    let _ = writeln!(md, "- ic_spearman_1d: {:.4}", result.ic_spearman_1d);
    let _ = writeln!(md, "- ic_perm_pvalue: {:.4}", result.ic_perm_pvalue);
    let _ = writeln!(md, "- events_n: {}", result.events_n);
    let _ = writeln!(
        md,
        "- event_mean_1d: {:.6} (CI [{:.6}, {:.6}])",
        result.event_mean_1d, result.event_mean_1d_ci_lo, result.event_mean_1d_ci_hi
    );
    let _ = writeln!(
        md,
        "- event_mean_3d: {:.6} (CI [{:.6}, {:.6}])",
        result.event_mean_3d, result.event_mean_3d_ci_lo, result.event_mean_3d_ci_hi
    );
    md
}

// ============================================
// Simulation
// ============================================

pub fn backtest_markdown(
    result: &SimulationResult,
    params: &StrategyParams,
    merged_path: &Path,
    portfolio_path: &Path,
) -> String {
    let mut md = String::new();
    md.push_str("# Simple Trading Simulation\n\n");
    md.push_str("Strategy:\n");
    md.push_str("- Build daily signal from news features.\n");
    md.push_str(
        "- Long if sentiment >= threshold on burst days; short if <= -threshold on burst days.\n",
    );
    md.push_str("- Execute with a 1-day delay.\n");
    md.push_str("- Equal-weight portfolio across tickers with positions that day.\n\n");

    md.push_str("Parameters:\n");
    let _ = writeln!(md, "- sent_thresh: {}", params.sent_thresh);
    let _ = writeln!(md, "- vol_thresh: {}", params.vol_thresh);
    let _ = writeln!(md, "- min_docs: {}", params.min_docs);
    let _ = writeln!(md, "- slippage_bps: {}", params.slippage_bps);

    md.push_str("\nResults:\n");
    let _ = writeln!(md, "- signal_days (raw): {}", result.n_signal_days);
    let _ = writeln!(md, "- trades (executed): {}", result.n_trades);
    let _ = writeln!(md, "- trading_days: {}", result.trading_days());
    let _ = writeln!(md, "- total_return: {:.4}", result.total_return);
    let _ = writeln!(md, "- sharpe_annual: {:.4}", result.sharpe_annual);
    let _ = writeln!(md, "- max_drawdown: {:.4}", result.max_drawdown);

    md.push_str("\nFiles:\n");
    let _ = writeln!(md, "- merged_table: {}", merged_path.display());
    let _ = writeln!(md, "- portfolio_daily: {}", portfolio_path.display());
    md
}

// ============================================
// Sweep
// ============================================

pub fn sweep_markdown(rows: &[SweepRow]) -> String {
    let mut md = String::new();
    md.push_str("# Parameter Sweep (Sensitivity)\n\n");
    md.push_str(
        "Each row re-runs the simulation with one combination of thresholds and slippage.\n\n",
    );
    let _ = writeln!(md, "- rows_tested: {}", rows.len());
    if let Some((min, max)) = trades_range(rows) {
        let _ = writeln!(md, "- trades_range: {} → {}", min, max);
    }

    md.push_str("\n## Top configs (by trades, then total return)\n\n");
    md.push_str(
        "| sent_thresh | vol_thresh | min_docs | slippage_bps | trades | total_return | sharpe_ann | max_drawdown |\n",
    );
    md.push_str("|---:|---:|---:|---:|---:|---:|---:|---:|\n");
    for r in top_configs(rows, SWEEP_TOP_N) {
        let _ = writeln!(
            md,
            "| {:.2} | {:.1} | {} | {} | {} | {:.4} | {:.4} | {:.4} |",
            r.sent_thresh,
            r.vol_thresh,
            r.min_docs,
            r.slippage_bps,
            r.trades,
            r.total_return,
            r.sharpe_ann,
            r.max_drawdown
        );
    }

    md.push_str("\n## Notes\n");
    md.push_str("- Very low trade counts can make Sharpe unstable (one bad day dominates).\n");
    md.push_str("- Treat this as a sensitivity check, not an optimizer.\n");
    md
}

// ============================================
// Latest Results
// ============================================

/// Headline numbers gathered from a full pipeline run.
#[derive(Debug, Clone, Default)]
pub struct LatestResults {
    pub tickers: usize,
    pub eval: Option<EvalResult>,
    pub best_sweep: Option<SweepRow>,
}

impl LatestResults {
    pub fn new(tickers: usize) -> Self {
        Self {
            tickers,
            ..Self::default()
        }
    }

    pub fn with_eval(mut self, eval: EvalResult) -> Self {
        self.eval = Some(eval);
        self
    }

    /// Keeps the top-ranked sweep row, if any.
    pub fn with_sweep(mut self, rows: &[SweepRow]) -> Self {
        self.best_sweep = top_configs(rows, 1).into_iter().next();
        self
    }
}

pub fn latest_results_markdown(latest: &LatestResults) -> String {
    let mut md = String::new();
    md.push_str("## Results (latest run)\n\n");
    let _ = writeln!(md, "- tickers: {}", latest.tickers);
    if let Some(eval) = &latest.eval {
        let _ = writeln!(
            md,
            "- IC (Spearman, 1D): {:.4} (perm p={:.4})",
            eval.ic_spearman_1d, eval.ic_perm_pvalue
        );
        let _ = writeln!(md, "- event study burst days: n={}", eval.events_n);
    }
    if let Some(best) = &latest.best_sweep {
        let _ = writeln!(
            md,
            "- best sweep config: sent={}, vol={}, min_docs={}, slip_bps={} (trades={}, total_return={:.4})",
            best.sent_thresh,
            best.vol_thresh,
            best.min_docs,
            best.slippage_bps,
            best.trades,
            best.total_return
        );
    }
    md
}
