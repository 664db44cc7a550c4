use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tickers evaluated when neither the config file nor the CLI names any.
pub const DEFAULT_TICKERS: &[&str] = &[
    "aapl.us", "msft.us", "nvda.us", "amzn.us", "tsla.us", "meta.us", "googl.us", "jpm.us",
    "xom.us", "unh.us", "cost.us", "avgo.us", "v.us", "ma.us", "spy.us",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub paths: PathsConfig,
    pub strategy: StrategyParams,
    pub sweep: SweepGrid,
    pub stats: StatsConfig,
    pub events: EventFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Scored news items written by the external sentiment scorer.
    pub scored_news: PathBuf,
    /// Daily feature table (one row per ticker-day).
    pub features: PathBuf,
    /// Directory holding one `<ticker>.csv` price cache per instrument.
    pub prices_dir: PathBuf,
    pub report_dir: PathBuf,
}

/// Thresholds and costs for one run of the strategy simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub sent_thresh: f64,
    pub vol_thresh: f64,
    pub min_docs: u32,
    pub slippage_bps: f64,
}

/// Independent value grids swept by the parameter sweep engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepGrid {
    pub sent_thresh: Vec<f64>,
    pub vol_thresh: Vec<f64>,
    pub min_docs: Vec<u32>,
    pub slippage_bps: Vec<f64>,
}

/// Resampling settings shared by the permutation test and the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub n_permutations: usize,
    pub n_bootstrap: usize,
    pub confidence_level: f64,
    pub seed: u64,
}

/// Burst-day criteria for the event study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub min_volume_z: f64,
    pub min_docs: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| (*t).to_string()).collect(),
            paths: PathsConfig::default(),
            strategy: StrategyParams::default(),
            sweep: SweepGrid::default(),
            stats: StatsConfig::default(),
            events: EventFilter::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scored_news: PathBuf::from("data/news/scored_items.csv"),
            features: PathBuf::from("data/features/daily_features.csv"),
            prices_dir: PathBuf::from("data/prices"),
            report_dir: PathBuf::from("report"),
        }
    }
}

impl PathsConfig {
    #[must_use]
    pub fn merged_table(&self) -> PathBuf {
        self.report_dir.join("merged_table.csv")
    }

    #[must_use]
    pub fn portfolio_daily(&self) -> PathBuf {
        self.report_dir.join("portfolio_daily.csv")
    }

    #[must_use]
    pub fn sweep_results(&self) -> PathBuf {
        self.report_dir.join("sweep.csv")
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            sent_thresh: 0.05,
            vol_thresh: 1.0,
            min_docs: 10,
            slippage_bps: 2.0,
        }
    }
}

impl StrategyParams {
    /// Slippage charged per executed trade, as a decimal return.
    #[must_use]
    pub fn slippage_rate(&self) -> f64 {
        self.slippage_bps / 10_000.0
    }
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            sent_thresh: vec![0.02, 0.05, 0.08, 0.10],
            vol_thresh: vec![0.5, 1.0, 1.5, 2.0],
            min_docs: vec![5, 10, 20],
            slippage_bps: vec![0.0, 2.0, 5.0],
        }
    }
}

impl SweepGrid {
    /// Returns the number of parameter combinations in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent_thresh.len() * self.vol_thresh.len() * self.min_docs.len() * self.slippage_bps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the grid into its Cartesian product.
    ///
    /// Iteration order is nested: `sent_thresh` outermost, then `vol_thresh`,
    /// `min_docs`, and `slippage_bps` innermost.
    #[must_use]
    pub fn combinations(&self) -> Vec<StrategyParams> {
        let mut combos = Vec::with_capacity(self.len());
        for &sent_thresh in &self.sent_thresh {
            for &vol_thresh in &self.vol_thresh {
                for &min_docs in &self.min_docs {
                    for &slippage_bps in &self.slippage_bps {
                        combos.push(StrategyParams {
                            sent_thresh,
                            vol_thresh,
                            min_docs,
                            slippage_bps,
                        });
                    }
                }
            }
        }
        combos
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            n_permutations: 1000,
            n_bootstrap: 2000,
            confidence_level: 0.95,
            seed: 42,
        }
    }
}

impl StatsConfig {
    /// Sets the seed used by every resampling procedure.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            min_volume_z: 1.0,
            min_docs: 10,
        }
    }
}

impl EventFilter {
    /// Returns true if a ticker-day qualifies as a news burst.
    #[must_use]
    pub fn is_burst(&self, volume_z: f64, docs: u32) -> bool {
        volume_z >= self.min_volume_z && docs >= self.min_docs
    }
}
