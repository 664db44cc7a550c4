pub mod config;
pub mod config_loader;
pub mod signal;
pub mod table;

pub use config::{
    AppConfig, EventFilter, PathsConfig, StatsConfig, StrategyParams, SweepGrid, DEFAULT_TICKERS,
};
pub use config_loader::ConfigLoader;
pub use signal::Signal;
pub use table::{
    normalize_ticker, DailyFeatureRow, ForwardReturnRow, MergedRow, PortfolioDay, PricePoint,
    SweepRow,
};
