//! Helpers shared by the pipeline stages.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use newsalpha_backtest::{
    build_eval_table, load_feature_table, CsvPriceCache, InMemoryPrices, PriceSource,
};
use newsalpha_core::{normalize_ticker, AppConfig, ConfigLoader, MergedRow};
use std::path::Path;

/// Overrides applied on top of the layered configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Comma-separated tickers (e.g. aapl.us,msft.us,spy.us)
    #[arg(long, global = true)]
    pub tickers: Option<String>,

    /// Sentiment threshold for long/short
    #[arg(long, global = true)]
    pub sent_thresh: Option<f64>,

    /// volume_z threshold for burst days
    #[arg(long, global = true)]
    pub vol_thresh: Option<f64>,

    /// Minimum docs for a signal day
    #[arg(long, global = true)]
    pub min_docs: Option<u32>,

    /// Slippage per trade in basis points
    #[arg(long, global = true)]
    pub slippage_bps: Option<f64>,

    /// Seed for the permutation test and bootstrap
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl OverrideArgs {
    /// Writes every provided flag into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(tickers) = &self.tickers {
            config.tickers = parse_tickers(tickers);
        }
        if let Some(v) = self.sent_thresh {
            config.strategy.sent_thresh = v;
        }
        if let Some(v) = self.vol_thresh {
            config.strategy.vol_thresh = v;
        }
        if let Some(v) = self.min_docs {
            config.strategy.min_docs = v;
        }
        if let Some(v) = self.slippage_bps {
            config.strategy.slippage_bps = v;
        }
        if let Some(seed) = self.seed {
            config.stats = config.stats.with_seed(seed);
        }
    }
}

/// Splits a comma-separated ticker list, dropping blanks.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_ticker)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Loads the layered configuration and applies CLI overrides.
pub fn load_config(path: Option<&Path>, overrides: &OverrideArgs) -> Result<AppConfig> {
    let mut config = match path {
        Some(_) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    overrides.apply(&mut config);
    Ok(config)
}

/// Output format for stage summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Builds the merged evaluation table from the feature table and price cache.
///
/// When `lenient` is set, tickers whose prices cannot be loaded are logged
/// and dropped instead of aborting the run.
pub fn build_merged_table(config: &AppConfig, lenient: bool) -> Result<Vec<MergedRow>> {
    let features = load_feature_table(&config.paths.features)
        .context("Failed to load daily feature table")?;
    let cache = CsvPriceCache::new(&config.paths.prices_dir);

    let merged = if lenient {
        let mut prices = InMemoryPrices::new();
        let mut available = Vec::new();
        for ticker in &config.tickers {
            match cache.load_prices(ticker) {
                Ok(series) => {
                    prices = prices.with_series(ticker, series);
                    available.push(ticker.clone());
                }
                Err(e) => tracing::warn!("- {}: price load FAILED: {}", ticker, e),
            }
        }
        build_eval_table(&available, &features, &prices)?
    } else {
        build_eval_table(&config.tickers, &features, &cache)?
    };

    tracing::info!(
        "Merged table: {} rows across {} requested tickers",
        merged.len(),
        config.tickers.len()
    );
    Ok(merged)
}

/// Writes a report file, creating its directory.
pub async fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote report: {}", path.display());
    Ok(())
}
