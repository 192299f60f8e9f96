//! Trade tape and fill-model comparison export (CSV/JSON).

use anyhow::{Context, Result};
use limitup_core::domain::{format_trade_date, Trade};
use std::path::Path;

use crate::metrics::FillModelSummary;

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;

    wtr.write_record([
        "strategy_id",
        "fill_model",
        "instrument_id",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "net_return",
        "net_return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            t.strategy_id.clone(),
            t.fill_model.to_string(),
            t.instrument_id.clone(),
            format_trade_date(t.entry_date),
            format!("{:.4}", t.entry_price),
            format_trade_date(t.exit_date),
            format!("{:.4}", t.exit_price),
            format!("{:.6}", t.net_return),
            format!("{:.4}", t.net_return * 100.0),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush trades CSV {}", path.display()))?;
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("Failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write trades JSON {}", path.display()))?;
    Ok(())
}

pub fn write_compare_csv(path: &Path, summaries: &[FillModelSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create comparison CSV {}", path.display()))?;
    wtr.write_record([
        "fill_model",
        "trade_count",
        "total_return",
        "max_drawdown",
        "win_rate",
    ])?;
    for s in summaries {
        wtr.write_record([
            s.fill_model.to_string(),
            s.trade_count.to_string(),
            format!("{:.6}", s.total_return),
            format!("{:.6}", s.max_drawdown),
            format!("{:.6}", s.win_rate),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush comparison CSV {}", path.display()))?;
    Ok(())
}
