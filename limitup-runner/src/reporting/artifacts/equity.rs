//! Equity curve export (CSV).

use anyhow::{Context, Result};
use limitup_core::domain::{format_trade_date, EquityPoint};
use std::path::Path;

pub fn write_equity_csv(path: &Path, equity: &[EquityPoint]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    wtr.write_record(["trade_date", "equity"])?;
    for point in equity {
        wtr.write_record([format_trade_date(point.trade_date), format!("{:.6}", point.equity)])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush equity CSV {}", path.display()))?;
    Ok(())
}
