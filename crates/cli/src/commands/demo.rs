//! Demo: runs features, eval, simulate and sweep in order, then writes the
//! latest results summary.

use super::common::{build_merged_table, write_report};
use super::eval::evaluate_table;
use super::features::{run_features, FeaturesArgs};
use super::simulate::simulate_table;
use super::sweep::sweep_table;
use crate::report::{latest_results_markdown, LatestResults, LATEST_REPORT};
use anyhow::{Context, Result};
use clap::Args;
use newsalpha_backtest::MetricsFormatter;
use newsalpha_core::AppConfig;

/// Arguments for the demo command.
#[derive(Args, Debug, Clone, Default)]
pub struct DemoArgs {
    /// Reuse the existing feature table instead of rebuilding it
    #[arg(long)]
    pub skip_features: bool,
}

pub async fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<LatestResults> {
    if args.skip_features {
        tracing::info!("Reusing feature table {}", config.paths.features.display());
    } else if config.paths.scored_news.exists() {
        run_features(FeaturesArgs::default(), config).await?;
    } else {
        tracing::warn!(
            "Scored news {} not found; reusing feature table {}",
            config.paths.scored_news.display(),
            config.paths.features.display()
        );
    }

    let merged = build_merged_table(config, true).context("Failed to build evaluation table")?;

    let eval = evaluate_table(merged.clone(), config).await?;
    print!("{}", MetricsFormatter::format_eval(&eval));

    let sim = simulate_table(merged.clone(), config).await?;
    print!("{}", MetricsFormatter::format_simulation(&sim, &config.strategy));

    let sweep = sweep_table(merged, config).await?;
    print!("{}", MetricsFormatter::format_sweep(&sweep));

    let latest = LatestResults::new(config.tickers.len())
        .with_eval(eval)
        .with_sweep(&sweep);
    let latest_path = config.paths.report_dir.join(LATEST_REPORT);
    write_report(&latest_path, &latest_results_markdown(&latest)).await?;
    println!("Wrote {}", latest_path.display());

    Ok(latest)
}
