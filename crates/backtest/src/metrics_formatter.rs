#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::evaluator::EvalResult;
use crate::simulator::SimulationResult;
use crate::sweep::{top_configs, trades_range};
use newsalpha_core::{StrategyParams, SweepRow};

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct MetricsFormatter;

impl MetricsFormatter {
    fn header(output: &mut String, title: &str) {
        output.push('\n');
        output.push_str(RULE);
        output.push_str(&format!("{:^63}\n", title));
        output.push_str(RULE);
        output.push('\n');
    }

    #[must_use]
    pub fn format_eval(result: &EvalResult) -> String {
        let mut output = String::new();
        Self::header(&mut output, "SIGNAL EVALUATION");

        output.push_str("Information Coefficient\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Merged Rows:           {}\n", result.merged_rows));
        output.push_str(&format!("IC (Spearman, 1D):     {:.4}\n", result.ic_spearman_1d));
        output.push_str(&format!("Permutation p-value:   {:.4}\n", result.ic_perm_pvalue));
        output.push('\n');

        output.push_str("Event Study (burst days)\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Events:                {}\n", result.events_n));
        output.push_str(&format!(
            "Mean 1D:               {:.6} [{:.6}, {:.6}]\n",
            result.event_mean_1d, result.event_mean_1d_ci_lo, result.event_mean_1d_ci_hi
        ));
        output.push_str(&format!(
            "Mean 3D:               {:.6} [{:.6}, {:.6}]\n",
            result.event_mean_3d, result.event_mean_3d_ci_lo, result.event_mean_3d_ci_hi
        ));
        output.push('\n');
        output.push_str(RULE);

        if result.events_n == 0 {
            output.push_str("\n⚠️  No burst days matched the event filter.\n\n");
        }

        output
    }

    #[must_use]
    pub fn format_simulation(result: &SimulationResult, params: &StrategyParams) -> String {
        let mut output = String::new();
        Self::header(&mut output, "STRATEGY SIMULATION");

        output.push_str("Parameters\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Sentiment Threshold:   {}\n", params.sent_thresh));
        output.push_str(&format!("Volume-z Threshold:    {}\n", params.vol_thresh));
        output.push_str(&format!("Min Docs:              {}\n", params.min_docs));
        output.push_str(&format!("Slippage (bps):        {}\n", params.slippage_bps));
        output.push('\n');

        output.push_str("Results\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Signal Days (raw):     {}\n", result.n_signal_days));
        output.push_str(&format!("Trades (executed):     {}\n", result.n_trades));
        output.push_str(&format!("Trading Days:          {}\n", result.trading_days()));
        output.push_str(&format!("Total Return:          {:.2}%\n", result.total_return * 100.0));
        output.push_str(&format!("Sharpe (annualized):   {:.4}\n", result.sharpe_annual));
        output.push_str(&format!("Max Drawdown:          {:.2}%\n", result.max_drawdown * 100.0));
        output.push('\n');
        output.push_str(RULE);

        if result.n_trades == 0 {
            output.push_str("\n⚠️  No trades were made during this simulation.\n");
            output.push_str("    Consider lowering the thresholds or widening the data range.\n\n");
        }

        output
    }

    #[must_use]
    pub fn format_sweep(rows: &[SweepRow]) -> String {
        let mut output = String::new();
        Self::header(&mut output, "PARAMETER SWEEP");

        output.push_str(&format!("Combinations Tested:   {}\n", rows.len()));
        if let Some((min, max)) = trades_range(rows) {
            output.push_str(&format!("Trades Range:          {} → {}\n", min, max));
        }
        output.push('\n');

        if let Some(best) = top_configs(rows, 1).first() {
            output.push_str("Best Config (by trades, then total return)\n");
            output.push_str(THIN_RULE);
            output.push_str(&format!(
                "sent={:.2} vol={:.1} min_docs={} slip_bps={}\n",
                best.sent_thresh, best.vol_thresh, best.min_docs, best.slippage_bps
            ));
            output.push_str(&format!(
                "trades={} total_return={:.4} sharpe={:.4} max_dd={:.4}\n",
                best.trades, best.total_return, best.sharpe_ann, best.max_drawdown
            ));
            output.push('\n');
        }
        output.push_str(RULE);

        output
    }
}
