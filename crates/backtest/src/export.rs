//! CSV persistence for pipeline tables.

use crate::error::{BacktestError, Result};
use newsalpha_core::{normalize_ticker, MergedRow, PortfolioDay, SweepRow};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const MERGED_COLUMNS: &[&str] = &[
    "ticker",
    "date",
    "docs",
    "avg_compound",
    "pos_frac",
    "neg_frac",
    "volume_z",
    "fwd_ret_1d",
    "fwd_ret_3d",
];

pub const PORTFOLIO_COLUMNS: &[&str] = &["date", "portfolio_ret", "n_positions", "equity"];

pub const SWEEP_COLUMNS: &[&str] = &[
    "sent_thresh",
    "vol_thresh",
    "min_docs",
    "slippage_bps",
    "trades",
    "sharpe_ann",
    "max_drawdown",
    "total_return",
];

/// Writes `rows` as CSV, creating parent directories. An empty table still
/// gets its header line.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T], columns: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the merged evaluation table; missing returns become empty cells.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_merged_table(path: &Path, rows: &[MergedRow]) -> Result<()> {
    write_rows(path, rows, MERGED_COLUMNS)
}

/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_portfolio(path: &Path, days: &[PortfolioDay]) -> Result<()> {
    write_rows(path, days, PORTFOLIO_COLUMNS)
}

/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_sweep_results(path: &Path, rows: &[SweepRow]) -> Result<()> {
    write_rows(path, rows, SWEEP_COLUMNS)
}

/// Reads a merged table previously written by [`write_merged_table`].
///
/// # Errors
///
/// Returns [`BacktestError::Config`] if the file does not exist, or a CSV
/// error on a malformed row.
pub fn load_merged_table(path: &Path) -> Result<Vec<MergedRow>> {
    if !path.exists() {
        return Err(BacktestError::Config(format!(
            "merged table not found: {}; run the simulate stage first",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<MergedRow>() {
        let mut row = result?;
        row.ticker = normalize_ticker(&row.ticker);
        rows.push(row);
    }
    Ok(rows)
}
