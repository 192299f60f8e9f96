//! Annotated dataset export (CSV/Parquet).

use anyhow::{bail, Context, Result};
use limitup_core::domain::{format_trade_date, AnnotatedBar};
use polars::prelude::{Column, DataFrame, ParquetWriter};
use std::fs::File;
use std::path::Path;

const COLUMNS: [&str; 20] = [
    "instrument_id",
    "trade_date",
    "open",
    "high",
    "low",
    "close",
    "previous_close",
    "volume",
    "turnover_amount",
    "board",
    "is_st",
    "limit_up_price",
    "price_limit_applicable",
    "label_limit_up",
    "label_one_word",
    "label_opened",
    "label_sealed",
    "streak_up",
    "next_open_ret",
    "next_close_ret",
];

/// Write rows as `.csv` or `.parquet`/`.pq`, chosen by extension.
pub fn write_annotated(path: &Path, rows: &[AnnotatedBar]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => write_annotated_csv(path, rows),
        Some("parquet") | Some("pq") => write_annotated_parquet(path, rows),
        _ => bail!(
            "Unsupported output format {} (expected .csv, .parquet or .pq)",
            path.display()
        ),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_annotated_csv(path: &Path, rows: &[AnnotatedBar]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create annotated CSV {}", path.display()))?;
    wtr.write_record(COLUMNS)?;

    for row in rows {
        let bar = &row.bar;
        wtr.write_record([
            bar.instrument_id.clone(),
            format_trade_date(bar.trade_date),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.previous_close.to_string(),
            bar.volume.to_string(),
            bar.turnover_amount.to_string(),
            row.board.as_str().to_string(),
            row.is_special_treatment.to_string(),
            optional(row.limit_up_price),
            row.price_limit_applicable.to_string(),
            row.label_limit_up.to_string(),
            row.label_one_word.to_string(),
            row.label_opened.to_string(),
            row.label_sealed.to_string(),
            row.streak_up.to_string(),
            optional(row.next_open_ret),
            optional(row.next_close_ret),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush annotated CSV {}", path.display()))?;
    Ok(())
}

fn annotated_dataframe(rows: &[AnnotatedBar]) -> Result<DataFrame> {
    let text = |f: fn(&AnnotatedBar) -> String| rows.iter().map(f).collect::<Vec<_>>();
    let number = |f: fn(&AnnotatedBar) -> f64| rows.iter().map(f).collect::<Vec<_>>();
    let maybe = |f: fn(&AnnotatedBar) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();
    let flag = |f: fn(&AnnotatedBar) -> bool| rows.iter().map(f).collect::<Vec<_>>();

    DataFrame::new(vec![
        Column::new("instrument_id".into(), text(|r| r.bar.instrument_id.clone())),
        Column::new("trade_date".into(), text(|r| format_trade_date(r.bar.trade_date))),
        Column::new("open".into(), number(|r| r.bar.open)),
        Column::new("high".into(), number(|r| r.bar.high)),
        Column::new("low".into(), number(|r| r.bar.low)),
        Column::new("close".into(), number(|r| r.bar.close)),
        Column::new("previous_close".into(), number(|r| r.bar.previous_close)),
        Column::new("volume".into(), number(|r| r.bar.volume)),
        Column::new("turnover_amount".into(), number(|r| r.bar.turnover_amount)),
        Column::new("board".into(), text(|r| r.board.as_str().to_string())),
        Column::new("is_st".into(), flag(|r| r.is_special_treatment)),
        Column::new("limit_up_price".into(), maybe(|r| r.limit_up_price)),
        Column::new("price_limit_applicable".into(), flag(|r| r.price_limit_applicable)),
        Column::new("label_limit_up".into(), flag(|r| r.label_limit_up)),
        Column::new("label_one_word".into(), flag(|r| r.label_one_word)),
        Column::new("label_opened".into(), flag(|r| r.label_opened)),
        Column::new("label_sealed".into(), flag(|r| r.label_sealed)),
        Column::new(
            "streak_up".into(),
            rows.iter().map(|r| r.streak_up).collect::<Vec<u32>>(),
        ),
        Column::new("next_open_ret".into(), maybe(|r| r.next_open_ret)),
        Column::new("next_close_ret".into(), maybe(|r| r.next_close_ret)),
    ])
    .context("Failed to build annotated dataframe")
}

fn write_annotated_parquet(path: &Path, rows: &[AnnotatedBar]) -> Result<()> {
    let mut df = annotated_dataframe(rows)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create annotated parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write annotated parquet")?;
    Ok(())
}
