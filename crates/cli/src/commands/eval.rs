//! Eval stage: information coefficient and burst-day event study.

use super::common::{build_merged_table, write_report, OutputFormat};
use crate::report::{eval_markdown, EVAL_REPORT};
use anyhow::{Context, Result};
use clap::Args;
use newsalpha_backtest::export::write_merged_table;
use newsalpha_backtest::{run_signal_eval, EvalConfig, EvalResult, MetricsFormatter};
use newsalpha_core::{AppConfig, MergedRow};

/// Arguments for the eval command.
#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl Default for EvalArgs {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

/// Evaluates an already merged table and writes the evaluation report.
pub async fn evaluate_table(rows: Vec<MergedRow>, config: &AppConfig) -> Result<EvalResult> {
    let eval_config = EvalConfig::new(config.stats, config.events);
    let result = tokio::task::spawn_blocking(move || run_signal_eval(&rows, &eval_config))
        .await
        .context("Evaluation task panicked")?;

    let report_path = config.paths.report_dir.join(EVAL_REPORT);
    write_report(&report_path, &eval_markdown(&result, config)).await?;
    Ok(result)
}

pub async fn run_eval(args: EvalArgs, config: &AppConfig) -> Result<EvalResult> {
    let format = OutputFormat::parse(&args.format)?;

    let merged = build_merged_table(config, false).context("Failed to build evaluation table")?;
    write_merged_table(&config.paths.merged_table(), &merged)
        .context("Failed to write merged table")?;

    let result = evaluate_table(merged, config).await?;

    match format {
        OutputFormat::Text => print!("{}", MetricsFormatter::format_eval(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(result)
}
