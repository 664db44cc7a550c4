use crate::stats::finite_or_zero;
use serde::{Deserialize, Serialize};

/// Trading days per year used to annualize daily Sharpe ratios.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub sharpe_annual: f64,
    pub max_drawdown: f64,
    pub num_days: usize,
}

/// Accumulates daily portfolio returns into an equity curve starting at 1.0.
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    returns: Vec<f64>,
    equity_curve: Vec<f64>,
}

impl MetricsCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compounds one daily return and returns the new equity value.
    pub fn add_return(&mut self, daily_return: f64) -> f64 {
        let previous = self.equity_curve.last().copied().unwrap_or(1.0);
        let equity = previous * (1.0 + daily_return);
        self.returns.push(daily_return);
        self.equity_curve.push(equity);
        equity
    }

    #[must_use]
    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    #[must_use]
    pub fn calculate(&self) -> PerformanceMetrics {
        let total_return = self
            .equity_curve
            .last()
            .map_or(0.0, |equity| equity - 1.0);

        PerformanceMetrics {
            total_return: finite_or_zero(total_return),
            sharpe_annual: annualized_sharpe(&self.returns),
            max_drawdown: max_drawdown(&self.equity_curve),
            num_days: self.returns.len(),
        }
    }
}

/// Annualized Sharpe ratio of daily returns using the population standard
/// deviation. Returns 0.0 for fewer than two observations or a zero/undefined
/// deviation.
#[must_use]
pub fn annualized_sharpe(daily_returns: &[f64]) -> f64 {
    let returns: Vec<f64> = daily_returns.iter().copied().filter(|r| r.is_finite()).collect();
    if returns.len() < 2 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 && std_dev.is_finite() {
        finite_or_zero(mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        0.0
    }
}

/// Most negative `equity / running_peak - 1` over the curve; 0.0 when empty.
#[must_use]
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;

    for &equity in equity_curve.iter().filter(|e| e.is_finite()) {
        peak = peak.max(equity);
        worst = worst.min(equity / peak - 1.0);
    }

    finite_or_zero(worst)
}
