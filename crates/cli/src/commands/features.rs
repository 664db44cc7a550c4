//! Features stage: scored news items to the daily feature table.

use anyhow::{Context, Result};
use clap::Args;
use newsalpha_core::AppConfig;
use newsalpha_signals::{build_feature_table, FeatureBuildSummary};
use std::path::PathBuf;

/// Arguments for the features command.
#[derive(Args, Debug, Clone, Default)]
pub struct FeaturesArgs {
    /// Scored news CSV (defaults to paths.scored_news)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Feature table output (defaults to paths.features)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run_features(args: FeaturesArgs, config: &AppConfig) -> Result<FeatureBuildSummary> {
    let input = args.input.unwrap_or_else(|| config.paths.scored_news.clone());
    let output = args.output.unwrap_or_else(|| config.paths.features.clone());

    tracing::info!("Building daily features from {}", input.display());

    let summary = tokio::task::spawn_blocking({
        let output = output.clone();
        move || build_feature_table(&input, &output)
    })
    .await
    .context("Feature build task panicked")?
    .context("Failed to build daily features")?;

    println!(
        "\nWrote daily features: rows={}, unique_days={}, path={}",
        summary.rows,
        summary.unique_days,
        output.display()
    );
    Ok(summary)
}
