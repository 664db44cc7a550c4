//! Simulate stage: lagged equal-weight strategy over the merged table.

use super::common::{build_merged_table, write_report, OutputFormat};
use crate::report::{backtest_markdown, BACKTEST_REPORT};
use anyhow::{Context, Result};
use clap::Args;
use newsalpha_backtest::export::{write_merged_table, write_portfolio};
use newsalpha_backtest::{simulate, MetricsFormatter, SimulationResult};
use newsalpha_core::{AppConfig, MergedRow};
use serde::Serialize;

/// Arguments for the simulate command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

#[derive(Serialize)]
struct SimulationSummary<'a> {
    n_signal_days: usize,
    n_trades: usize,
    trading_days: usize,
    sharpe_annual: f64,
    max_drawdown: f64,
    total_return: f64,
    portfolio_csv: &'a std::path::Path,
}

/// Simulates an already merged table, writing the merged table, portfolio
/// CSV and backtest report.
pub async fn simulate_table(rows: Vec<MergedRow>, config: &AppConfig) -> Result<SimulationResult> {
    let merged_path = config.paths.merged_table();
    write_merged_table(&merged_path, &rows).context("Failed to write merged table")?;

    let params = config.strategy;
    let result = tokio::task::spawn_blocking(move || simulate(&rows, &params))
        .await
        .context("Simulation task panicked")?;

    let portfolio_path = config.paths.portfolio_daily();
    write_portfolio(&portfolio_path, &result.portfolio)
        .context("Failed to write portfolio table")?;

    let report_path = config.paths.report_dir.join(BACKTEST_REPORT);
    let report = backtest_markdown(&result, &params, &merged_path, &portfolio_path);
    write_report(&report_path, &report).await?;
    Ok(result)
}

pub async fn run_simulate(args: SimulateArgs, config: &AppConfig) -> Result<SimulationResult> {
    let format = OutputFormat::parse(&args.format)?;

    let merged = build_merged_table(config, false).context("Failed to build evaluation table")?;
    let result = simulate_table(merged, config).await?;

    match format {
        OutputFormat::Text => print!(
            "{}",
            MetricsFormatter::format_simulation(&result, &config.strategy)
        ),
        OutputFormat::Json => {
            let portfolio_csv = config.paths.portfolio_daily();
            let summary = SimulationSummary {
                n_signal_days: result.n_signal_days,
                n_trades: result.n_trades,
                trading_days: result.trading_days(),
                sharpe_annual: result.sharpe_annual,
                max_drawdown: result.max_drawdown,
                total_return: result.total_return,
                portfolio_csv: &portfolio_csv,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(result)
}
