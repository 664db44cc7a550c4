//! Sweep stage: parameter sensitivity over the saved merged table.

use super::common::write_report;
use crate::report::{sweep_markdown, SWEEP_REPORT};
use anyhow::{Context, Result};
use clap::Args;
use newsalpha_backtest::export::{load_merged_table, write_sweep_results};
use newsalpha_backtest::{run_sweep, MetricsFormatter};
use newsalpha_core::{AppConfig, MergedRow, SweepRow};
use std::path::PathBuf;

/// Arguments for the sweep command.
#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// Merged table to sweep (defaults to the one written by simulate)
    #[arg(long)]
    pub merged: Option<PathBuf>,
}

/// Sweeps the configured grid over `rows` and writes the sweep CSV and report.
pub async fn sweep_table(rows: Vec<MergedRow>, config: &AppConfig) -> Result<Vec<SweepRow>> {
    if config.sweep.is_empty() {
        tracing::warn!("Sweep grid has an empty axis; no combinations to test");
    }

    let grid = config.sweep.clone();
    let results = tokio::task::spawn_blocking(move || run_sweep(&rows, &grid))
        .await
        .context("Sweep task panicked")?;

    let csv_path = config.paths.sweep_results();
    write_sweep_results(&csv_path, &results).context("Failed to write sweep results")?;
    println!("Wrote {}", csv_path.display());

    let report_path = config.paths.report_dir.join(SWEEP_REPORT);
    write_report(&report_path, &sweep_markdown(&results)).await?;
    Ok(results)
}

pub async fn run_sweep_stage(args: SweepArgs, config: &AppConfig) -> Result<Vec<SweepRow>> {
    let merged_path = args.merged.unwrap_or_else(|| config.paths.merged_table());
    let rows = load_merged_table(&merged_path).context("Failed to load merged table")?;

    let results = sweep_table(rows, config).await?;
    print!("{}", MetricsFormatter::format_sweep(&results));
    Ok(results)
}
