//! Input loading for the runner.
//!
//! Reads the daily-bar and instrument tables (CSV or Parquet), builds the
//! instrument lookup and fingerprints the dataset so artifacts can be traced
//! back to the exact inputs that produced them.

use limitup_core::data::{read_daily_bars, read_instruments, IngestError};
use limitup_core::domain::{DailyBar, InstrumentTable};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load daily bars: {0}")]
    Daily(#[source] IngestError),

    #[error("failed to load instruments: {0}")]
    Instruments(#[source] IngestError),
}

/// Loaded inputs plus provenance.
#[derive(Debug)]
pub struct LoadedData {
    pub bars: Vec<DailyBar>,
    pub instruments: InstrumentTable,
    /// BLAKE3 over every bar in (instrument, date) order.
    pub dataset_hash: String,
}

pub fn load_inputs(daily: &Path, instruments: &Path) -> Result<LoadedData, LoadError> {
    let bars = read_daily_bars(daily).map_err(LoadError::Daily)?;
    let instrument_rows = read_instruments(instruments).map_err(LoadError::Instruments)?;
    let instrument_count = instrument_rows.len();
    let instruments: InstrumentTable = instrument_rows.into_iter().collect();
    let dataset_hash = compute_dataset_hash(&bars);

    info!(
        bars = bars.len(),
        instruments = instrument_count,
        dataset_hash = %&dataset_hash[..12],
        "loaded inputs"
    );
    Ok(LoadedData {
        bars,
        instruments,
        dataset_hash,
    })
}

/// Deterministic BLAKE3 hash over all bar data, independent of input row order.
pub fn compute_dataset_hash(bars: &[DailyBar]) -> String {
    let mut order: Vec<&DailyBar> = bars.iter().collect();
    order.sort_by(|a, b| {
        (a.instrument_id.as_str(), a.trade_date).cmp(&(b.instrument_id.as_str(), b.trade_date))
    });

    let mut hasher = blake3::Hasher::new();
    for bar in order {
        hasher.update(bar.instrument_id.as_bytes());
        hasher.update(bar.trade_date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.previous_close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
        hasher.update(&bar.turnover_amount.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
