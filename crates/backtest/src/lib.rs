pub mod data_provider;
pub mod error;
pub mod eval_table;
pub mod evaluator;
pub mod export;
pub mod metrics;
pub mod metrics_formatter;
pub mod returns;
pub mod simulator;
pub mod stats;
pub mod sweep;

pub use data_provider::{load_feature_table, CsvPriceCache, InMemoryPrices, PriceSource};
pub use error::{BacktestError, Result};
pub use eval_table::build_eval_table;
pub use evaluator::{run_signal_eval, EvalConfig, EvalResult};
pub use metrics::{annualized_sharpe, max_drawdown, MetricsCalculator, PerformanceMetrics};
pub use metrics_formatter::MetricsFormatter;
pub use returns::{compute_forward_returns, forward_returns};
pub use simulator::{execute_signals, simulate, ExecutedRow, SimulationResult};
pub use stats::{bootstrap_mean_ci, permutation_pvalue, spearman_ic, BootstrapInterval, StatsEngine};
pub use sweep::{run_sweep, sweep_combination, top_configs, trades_range};
