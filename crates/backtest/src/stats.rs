//! Rank correlation, permutation significance and bootstrap intervals.
//!
//! Every function here is pure: inputs are slices of optional values, missing
//! or non-finite entries are dropped, and all randomness comes from a
//! `ChaCha8Rng` seeded by the caller. Too-small samples never error; they
//! resolve to a neutral value instead:
//!
//! | statistic | minimum sample | neutral value |
//! |---|---|---|
//! | [`spearman_ic`] | 10 pairs | `0.0` |
//! | [`permutation_pvalue`] | 10 pairs | `1.0` |
//! | [`bootstrap_mean_ci`] | 5 values | `(mean, mean, mean)` |
//!
//! # Example
//!
//! ```ignore
//! use newsalpha_backtest::stats::{bootstrap_mean_ci, spearman_ic};
//!
//! let ic = spearman_ic(&sentiment, &next_day_returns);
//! let ci = bootstrap_mean_ci(&event_returns, 2000, 42, 0.95);
//! println!("IC {ic:.4}, event mean {:.4} [{:.4}, {:.4}]", ci.mean, ci.lo, ci.hi);
//! ```

use newsalpha_core::StatsConfig;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Minimum number of complete pairs for a rank correlation.
pub const MIN_IC_PAIRS: usize = 10;

/// Minimum number of values for a resampled bootstrap interval.
pub const MIN_BOOTSTRAP_SAMPLES: usize = 5;

// ============================================
// Helpers
// ============================================

/// Maps NaN and infinities to 0.0.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Keeps only the positions where both series hold a finite value.
fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(&a, &b)| Some((present(a)?, present(b)?)))
        .unzip()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Assigns 1-based ranks, giving tied values the average of their positions.
#[must_use]
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end (0-based) share ranks start+1..=end
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank;
        }
        start = end;
    }
    ranks
}

/// Pearson correlation of two equal-length series.
///
/// Returns NaN when either series has zero variance.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f64::NAN;
    }
    let mx = mean(&x[..n]);
    let my = mean(&y[..n]);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    cov / (var_x * var_y).sqrt()
}

/// Quantile of a sorted sample using linear interpolation between order
/// statistics.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

// ============================================
// Rank Correlation
// ============================================

/// Spearman rank correlation (information coefficient) between two series.
///
/// Pairs where either side is missing are dropped first. Returns 0.0 when
/// fewer than [`MIN_IC_PAIRS`] pairs remain or the correlation is undefined.
#[must_use]
pub fn spearman_ic(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys) = complete_pairs(x, y);
    if xs.len() < MIN_IC_PAIRS {
        return 0.0;
    }
    finite_or_zero(pearson(&fractional_ranks(&xs), &fractional_ranks(&ys)))
}

/// Two-sided permutation p-value for the information coefficient.
///
/// Under the null hypothesis that `x` and `y` are unrelated, `y` is shuffled
/// `n_perm` times and the IC recomputed; the p-value is the fraction of trials
/// with `|IC_perm| >= |IC_obs|`. Each trial shuffles a fresh copy of the
/// original ordering. Returns 1.0 when fewer than [`MIN_IC_PAIRS`] complete
/// pairs exist.
#[must_use]
pub fn permutation_pvalue(x: &[Option<f64>], y: &[Option<f64>], n_perm: usize, seed: u64) -> f64 {
    let (xs, ys) = complete_pairs(x, y);
    if xs.len() < MIN_IC_PAIRS || n_perm == 0 {
        return 1.0;
    }

    // Ranking commutes with shuffling, so the ranks are computed once.
    let x_ranks = fractional_ranks(&xs);
    let y_ranks = fractional_ranks(&ys);
    let observed = finite_or_zero(pearson(&x_ranks, &y_ranks)).abs();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shuffled = y_ranks.clone();
    let mut extreme = 0usize;
    for _ in 0..n_perm {
        shuffled.copy_from_slice(&y_ranks);
        shuffled.shuffle(&mut rng);
        if finite_or_zero(pearson(&x_ranks, &shuffled)).abs() >= observed {
            extreme += 1;
        }
    }

    extreme as f64 / n_perm as f64
}

// ============================================
// Bootstrap
// ============================================

/// Point estimate with a percentile confidence interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapInterval {
    pub mean: f64,
    pub lo: f64,
    pub hi: f64,
}

impl BootstrapInterval {
    /// Degenerate interval collapsed onto a single value.
    #[must_use]
    pub fn point(value: f64) -> Self {
        Self {
            mean: value,
            lo: value,
            hi: value,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// Returns true if zero lies outside the interval.
    #[must_use]
    pub fn excludes_zero(&self) -> bool {
        self.lo > 0.0 || self.hi < 0.0
    }

    /// Replaces any non-finite bound with 0.0.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            mean: finite_or_zero(self.mean),
            lo: finite_or_zero(self.lo),
            hi: finite_or_zero(self.hi),
        }
    }
}

/// Bootstrap confidence interval for the mean of a series.
///
/// Draws `n_boot` resamples with replacement, each the size of the valid
/// sample, and reads the interval off the sorted resample means. Fewer than
/// [`MIN_BOOTSTRAP_SAMPLES`] valid values yield a degenerate interval at the
/// plain mean (0.0 for an empty series). The interval always contains the
/// observed mean.
#[must_use]
pub fn bootstrap_mean_ci(
    values: &[Option<f64>],
    n_boot: usize,
    seed: u64,
    confidence_level: f64,
) -> BootstrapInterval {
    let sample: Vec<f64> = values.iter().filter_map(|&v| present(v)).collect();
    let observed = mean(&sample);
    if sample.len() < MIN_BOOTSTRAP_SAMPLES || n_boot == 0 {
        return BootstrapInterval::point(observed);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = sample.len();
    let mut means: Vec<f64> = (0..n_boot)
        .map(|_| {
            let total: f64 = (0..n).map(|_| sample[rng.gen_range(0..n)]).sum();
            total / n as f64
        })
        .collect();
    means.sort_by(f64::total_cmp);

    let alpha = 1.0 - confidence_level;
    let lo = quantile(&means, alpha / 2.0);
    let hi = quantile(&means, 1.0 - alpha / 2.0);

    BootstrapInterval {
        mean: observed,
        lo: lo.min(observed),
        hi: hi.max(observed),
    }
}

// ============================================
// Configured Engine
// ============================================

/// Statistics bound to one resampling configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine {
    config: StatsConfig,
}

impl StatsEngine {
    #[must_use]
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    #[must_use]
    pub fn ic(&self, x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        spearman_ic(x, y)
    }

    #[must_use]
    pub fn ic_pvalue(&self, x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        permutation_pvalue(x, y, self.config.n_permutations, self.config.seed)
    }

    #[must_use]
    pub fn bootstrap_mean(&self, values: &[Option<f64>]) -> BootstrapInterval {
        bootstrap_mean_ci(
            values,
            self.config.n_bootstrap,
            self.config.seed,
            self.config.confidence_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn linear_series(n: usize) -> Vec<Option<f64>> {
        (0..n).map(|i| Some(i as f64)).collect()
    }

    /// Deterministic pseudo-noise so tests do not depend on an RNG.
    fn wiggle(n: usize) -> Vec<Option<f64>> {
        (0..n).map(|i| Some(((i * 37 + 11) % 23) as f64 - 11.0)).collect()
    }

    // ============================================================
    // Ranks and Helpers
    // ============================================================

    #[test]
    fn fractional_ranks_average_ties() {
        let ranks = fractional_ranks(&[10.0, 20.0, 20.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn fractional_ranks_all_equal() {
        let ranks = fractional_ranks(&[1.0, 1.0, 1.0]);
        assert_eq!(ranks, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn pearson_zero_variance_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile(&sorted, 0.5) - 3.0).abs() < 1e-12);
        assert!((quantile(&sorted, 0.125) - 1.5).abs() < 1e-12);
        assert!((quantile(&sorted, 1.0) - 5.0).abs() < 1e-12);
        assert!((quantile(&[], 0.5)).abs() < f64::EPSILON);
    }

    #[test]
    fn finite_or_zero_normalizes_nan() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-0.25), -0.25);
    }

    // ============================================================
    // Spearman IC
    // ============================================================

    #[test]
    fn ic_perfect_monotone_is_one() {
        let x = linear_series(12);
        let y: Vec<Option<f64>> = (0..12).map(|i| Some((i as f64).powi(3))).collect();

        assert!((spearman_ic(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ic_reversed_is_minus_one() {
        let x = linear_series(15);
        let y: Vec<Option<f64>> = (0..15).map(|i| Some(-(i as f64))).collect();

        assert!((spearman_ic(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn ic_fewer_than_ten_pairs_is_exactly_zero() {
        let x = linear_series(9);
        let y = linear_series(9);

        assert_eq!(spearman_ic(&x, &y), 0.0);
    }

    #[test]
    fn ic_drops_incomplete_pairs_before_counting() {
        let mut x = linear_series(12);
        let mut y = linear_series(12);
        x[0] = None;
        y[5] = Some(f64::NAN);
        y[7] = None;

        // only 9 complete pairs remain
        assert_eq!(spearman_ic(&x, &y), 0.0);
    }

    #[test]
    fn ic_invariant_to_positive_scaling() {
        let x = linear_series(20);
        let y = wiggle(20);
        let x_scaled: Vec<Option<f64>> = x.iter().map(|v| v.map(|v| v * 3.5)).collect();
        let y_scaled: Vec<Option<f64>> = y.iter().map(|v| v.map(|v| v * 0.01)).collect();

        let base = spearman_ic(&x, &y);
        assert!((base - spearman_ic(&x_scaled, &y_scaled)).abs() < 1e-12);
    }

    #[test]
    fn ic_invariant_to_monotone_transform() {
        let x = wiggle(25);
        let y = linear_series(25);
        let x_exp: Vec<Option<f64>> = x.iter().map(|v| v.map(f64::exp)).collect();

        assert!((spearman_ic(&x, &y) - spearman_ic(&x_exp, &y)).abs() < 1e-12);
    }

    #[test]
    fn ic_constant_series_is_zero() {
        let x = some(&[1.0; 12]);
        let y = linear_series(12);

        assert_eq!(spearman_ic(&x, &y), 0.0);
    }

    // ============================================================
    // Permutation Test
    // ============================================================

    #[test]
    fn pvalue_fewer_than_ten_pairs_is_exactly_one() {
        let x = linear_series(8);
        let y = linear_series(8);

        assert_eq!(permutation_pvalue(&x, &y, 1000, 42), 1.0);
    }

    #[test]
    fn pvalue_strong_relationship_is_small() {
        let x = linear_series(40);
        let y = linear_series(40);

        assert!(permutation_pvalue(&x, &y, 500, 42) < 0.01);
    }

    #[test]
    fn pvalue_is_reproducible_with_seed() {
        let x = linear_series(30);
        let y = wiggle(30);

        let p1 = permutation_pvalue(&x, &y, 1000, 42);
        let p2 = permutation_pvalue(&x, &y, 1000, 42);

        assert_eq!(p1, p2);
        assert!((0.0..=1.0).contains(&p1));
    }

    #[test]
    fn pvalue_constant_series_is_one() {
        let x = linear_series(12);
        let y = some(&[0.5; 12]);

        // observed IC is 0.0, so every shuffle is at least as extreme
        assert_eq!(permutation_pvalue(&x, &y, 100, 42), 1.0);
    }

    // ============================================================
    // Bootstrap
    // ============================================================

    #[test]
    fn bootstrap_small_sample_collapses_to_mean() {
        let ci = bootstrap_mean_ci(&some(&[0.01, 0.03, 0.02, 0.04]), 2000, 42, 0.95);

        assert!((ci.mean - 0.025).abs() < 1e-12);
        assert_eq!(ci.lo, ci.mean);
        assert_eq!(ci.hi, ci.mean);
    }

    #[test]
    fn bootstrap_single_value_collapses() {
        let ci = bootstrap_mean_ci(&[Some(0.01), None], 2000, 42, 0.95);
        assert_eq!(ci, BootstrapInterval::point(0.01));
    }

    #[test]
    fn bootstrap_empty_is_zero() {
        let ci = bootstrap_mean_ci(&[None, Some(f64::NAN)], 2000, 42, 0.95);
        assert_eq!(ci, BootstrapInterval::default());
    }

    #[test]
    fn bootstrap_interval_brackets_mean() {
        let values = wiggle(40);
        let ci = bootstrap_mean_ci(&values, 2000, 42, 0.95);

        assert!(ci.lo <= ci.mean);
        assert!(ci.mean <= ci.hi);
        assert!(ci.width() > 0.0);
    }

    #[test]
    fn bootstrap_constant_sample_has_zero_width() {
        let ci = bootstrap_mean_ci(&some(&[0.5; 10]), 500, 42, 0.95);

        assert!((ci.mean - 0.5).abs() < 1e-12);
        assert!(ci.width().abs() < 1e-12);
    }

    #[test]
    fn bootstrap_reproducible_with_seed() {
        let values = wiggle(30);

        let a = bootstrap_mean_ci(&values, 2000, 42, 0.95);
        let b = bootstrap_mean_ci(&values, 2000, 42, 0.95);

        assert_eq!(a, b);
    }

    #[test]
    fn bootstrap_different_with_different_seeds() {
        let values = wiggle(30);

        let a = bootstrap_mean_ci(&values, 2000, 1, 0.95);
        let b = bootstrap_mean_ci(&values, 2000, 2, 0.95);

        assert_eq!(a.mean, b.mean);
        assert!(a.lo != b.lo || a.hi != b.hi);
    }

    #[test]
    fn bootstrap_positive_sample_excludes_zero() {
        let values: Vec<Option<f64>> = (1..=30).map(|i| Some(0.01 + f64::from(i) * 0.0001)).collect();
        let ci = bootstrap_mean_ci(&values, 1000, 42, 0.95);

        assert!(ci.excludes_zero());
    }

    // ============================================================
    // StatsEngine
    // ============================================================

    #[test]
    fn engine_uses_configured_seed_and_counts() {
        let engine = StatsEngine::new(StatsConfig::default().with_seed(9));
        let x = linear_series(20);
        let y = wiggle(20);

        assert_eq!(engine.config().seed, 9);
        assert_eq!(engine.ic_pvalue(&x, &y), permutation_pvalue(&x, &y, 1000, 9));
        assert_eq!(engine.bootstrap_mean(&y), bootstrap_mean_ci(&y, 2000, 9, 0.95));
        assert_eq!(engine.ic(&x, &y), spearman_ic(&x, &y));
    }
}
