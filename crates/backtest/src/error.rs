use thiserror::Error;

/// Errors raised while assembling or persisting backtest tables.
///
/// Statistical degeneracy (too few samples, zero variance) is not an error;
/// those cases resolve to neutral values.
#[derive(Error, Debug)]
pub enum BacktestError {
    /// A required input table is missing or empty.
    #[error("configuration error: {0}")]
    Config(String),

    /// Price data for a ticker is absent or has an unexpected schema.
    #[error("missing data for {ticker}: {reason}")]
    MissingData { ticker: String, reason: String },

    /// IO error reading/writing a table.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BacktestError {
    pub(crate) fn missing_data(ticker: &str, reason: impl Into<String>) -> Self {
        Self::MissingData {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BacktestError>;
