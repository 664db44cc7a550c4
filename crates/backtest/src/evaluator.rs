//! Signal quality evaluation: information coefficient and burst-day event study.
//!
//! The IC is the Spearman correlation between same-day average sentiment and
//! the next-day forward return, with a permutation p-value. The event study
//! bootstraps mean forward returns over news-burst days only.

use crate::stats::{finite_or_zero, BootstrapInterval, StatsEngine};
use newsalpha_core::{EventFilter, MergedRow, StatsConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Settings for one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    pub stats: StatsConfig,
    pub events: EventFilter,
}

impl EvalConfig {
    #[must_use]
    pub fn new(stats: StatsConfig, events: EventFilter) -> Self {
        Self { stats, events }
    }
}

/// Outcome of [`run_signal_eval`]. Every float is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub merged_rows: usize,
    pub ic_spearman_1d: f64,
    pub ic_perm_pvalue: f64,
    pub events_n: usize,
    pub event_mean_1d: f64,
    pub event_mean_1d_ci_lo: f64,
    pub event_mean_1d_ci_hi: f64,
    pub event_mean_3d: f64,
    pub event_mean_3d_ci_lo: f64,
    pub event_mean_3d_ci_hi: f64,
}

impl EvalResult {
    /// Result for an empty table: zero statistics and a non-significant
    /// p-value.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(0, 0.0, 1.0, 0, BootstrapInterval::default(), BootstrapInterval::default())
    }

    fn from_parts(
        merged_rows: usize,
        ic: f64,
        pvalue: f64,
        events_n: usize,
        ci_1d: BootstrapInterval,
        ci_3d: BootstrapInterval,
    ) -> Self {
        let ci_1d = ci_1d.sanitized();
        let ci_3d = ci_3d.sanitized();
        Self {
            merged_rows,
            ic_spearman_1d: finite_or_zero(ic),
            ic_perm_pvalue: finite_or_zero(pvalue),
            events_n,
            event_mean_1d: ci_1d.mean,
            event_mean_1d_ci_lo: ci_1d.lo,
            event_mean_1d_ci_hi: ci_1d.hi,
            event_mean_3d: ci_3d.mean,
            event_mean_3d_ci_lo: ci_3d.lo,
            event_mean_3d_ci_hi: ci_3d.hi,
        }
    }

    #[must_use]
    pub fn event_ci_1d(&self) -> BootstrapInterval {
        BootstrapInterval {
            mean: self.event_mean_1d,
            lo: self.event_mean_1d_ci_lo,
            hi: self.event_mean_1d_ci_hi,
        }
    }

    #[must_use]
    pub fn event_ci_3d(&self) -> BootstrapInterval {
        BootstrapInterval {
            mean: self.event_mean_3d,
            lo: self.event_mean_3d_ci_lo,
            hi: self.event_mean_3d_ci_hi,
        }
    }
}

impl Default for EvalResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Evaluates the sentiment signal on a merged table.
#[must_use]
pub fn run_signal_eval(rows: &[MergedRow], config: &EvalConfig) -> EvalResult {
    if rows.is_empty() {
        return EvalResult::empty();
    }

    let engine = StatsEngine::new(config.stats);

    let sentiment: Vec<Option<f64>> = rows.iter().map(|r| Some(r.avg_compound)).collect();
    let next_day: Vec<Option<f64>> = rows.iter().map(|r| r.fwd_ret_1d).collect();
    let ic = engine.ic(&sentiment, &next_day);
    let pvalue = engine.ic_pvalue(&sentiment, &next_day);

    let events: Vec<&MergedRow> = rows
        .iter()
        .filter(|r| config.events.is_burst(r.volume_z, r.docs))
        .collect();
    let event_1d: Vec<Option<f64>> = events.iter().map(|r| r.fwd_ret_1d).collect();
    let event_3d: Vec<Option<f64>> = events.iter().map(|r| r.fwd_ret_3d).collect();

    let result = EvalResult::from_parts(
        rows.len(),
        ic,
        pvalue,
        events.len(),
        engine.bootstrap_mean(&event_1d),
        engine.bootstrap_mean(&event_3d),
    );

    info!(
        "Signal eval: rows={} ic={:.4} p={:.4} events={}",
        result.merged_rows, result.ic_spearman_1d, result.ic_perm_pvalue, result.events_n
    );
    result
}
