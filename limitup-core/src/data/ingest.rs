//! Read and write the canonical daily-bar and instrument tables.
//!
//! Inputs may be CSV or Parquet. Every column is read as text and parsed here,
//! so CSV and Parquet sources go through identical validation and error reporting.

use super::schema::{SchemaError, TableKind};
use crate::domain::{format_trade_date, parse_trade_date, Board, DailyBar, Instrument};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_SAMPLES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported input format {0} (expected .csv, .parquet or .pq)")]
    UnsupportedFormat(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

enum Format {
    Csv,
    Parquet,
}

fn detect_format(path: &Path) -> Result<Format, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(Format::Csv),
        Some("parquet") | Some("pq") => Ok(Format::Parquet),
        _ => Err(IngestError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_table(path: &Path) -> Result<DataFrame, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    let df = match detect_format(path)? {
        // infer_schema_length(0) keeps every CSV column as String
        Format::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        Format::Parquet => {
            let file = fs::File::open(path).map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish()?
        }
    };
    debug!(path = %path.display(), rows = df.height(), "read table");
    Ok(df)
}

/// Source columns of `df` re-keyed by canonical name, as text.
struct TextColumns {
    by_name: HashMap<&'static str, Vec<Option<String>>>,
    height: usize,
}

impl TextColumns {
    fn extract(df: &DataFrame, kind: TableKind) -> Result<Self, IngestError> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let mapping = kind.resolve_columns(names.iter().map(String::as_str))?;

        let mut by_name = HashMap::with_capacity(mapping.len());
        for (canonical, source) in mapping {
            let column = df.column(&source)?.cast(&DataType::String)?;
            let values: Vec<Option<String>> = column
                .str()?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect();
            by_name.insert(canonical, values);
        }
        Ok(Self {
            by_name,
            height: df.height(),
        })
    }

    /// Parse a column, collecting a few offending samples on failure.
    ///
    /// Absent optional columns are treated as all-null.
    fn parse<T>(
        &self,
        column: &'static str,
        expected: &'static str,
        parse: impl Fn(Option<&str>) -> Option<T>,
    ) -> Result<Vec<T>, SchemaError> {
        let nulls = vec![None; self.height];
        let values = self.by_name.get(column).unwrap_or(&nulls);

        let mut parsed = Vec::with_capacity(values.len());
        let mut samples = Vec::new();
        for value in values {
            match parse(value.as_deref()) {
                Some(v) => parsed.push(v),
                None => {
                    if samples.len() < MAX_SAMPLES {
                        samples.push(value.clone().unwrap_or_else(|| "<null>".to_string()));
                    }
                }
            }
        }
        if samples.is_empty() {
            Ok(parsed)
        } else {
            Err(SchemaError::InvalidValues {
                column: column.to_string(),
                expected,
                samples,
            })
        }
    }
}

fn is_blank(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("null")
}

fn parse_id(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    parse_trade_date(value?).ok()
}

fn parse_optional_date(value: Option<&str>) -> Option<Option<NaiveDate>> {
    match value {
        None => Some(None),
        Some(text) if is_blank(text) => Some(None),
        Some(text) => parse_trade_date(text).ok().map(Some),
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1/true/t/yes/y` and `0/false/f/no/n`, case-insensitive.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Null or blank flags read as `false`.
fn parse_optional_flag(value: Option<&str>) -> Option<bool> {
    match value {
        None => Some(false),
        Some(text) if is_blank(text) => Some(false),
        Some(text) => parse_flag(text),
    }
}

fn parse_board(value: Option<&str>) -> Option<Board> {
    value?.parse().ok()
}

fn parse_name(value: Option<&str>) -> Option<Option<String>> {
    Some(value.filter(|text| !is_blank(text)).map(|text| text.trim().to_string()))
}

/// Read a daily-bar table (CSV or Parquet) into canonical bars, preserving row order.
pub fn read_daily_bars(path: &Path) -> Result<Vec<DailyBar>, IngestError> {
    let df = read_table(path)?;
    let columns = TextColumns::extract(&df, TableKind::Daily)?;

    let ids = columns.parse("instrument_id", "instrument id", parse_id)?;
    let dates = columns.parse("trade_date", "date", parse_date)?;
    let open = columns.parse("open", "number", parse_number)?;
    let high = columns.parse("high", "number", parse_number)?;
    let low = columns.parse("low", "number", parse_number)?;
    let close = columns.parse("close", "number", parse_number)?;
    let previous_close = columns.parse("previous_close", "number", parse_number)?;
    let volume = columns.parse("volume", "number", parse_number)?;
    let turnover = columns.parse("turnover_amount", "number", parse_number)?;

    let bars = (0..columns.height)
        .map(|i| DailyBar {
            instrument_id: ids[i].clone(),
            trade_date: dates[i],
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            previous_close: previous_close[i],
            volume: volume[i],
            turnover_amount: turnover[i],
        })
        .collect();
    Ok(bars)
}

/// Read an instrument table (CSV or Parquet).
pub fn read_instruments(path: &Path) -> Result<Vec<Instrument>, IngestError> {
    let df = read_table(path)?;
    let columns = TextColumns::extract(&df, TableKind::Instruments)?;

    let ids = columns.parse("instrument_id", "instrument id", parse_id)?;
    let names = columns.parse("name", "name", parse_name)?;
    let boards = columns.parse("board", "board", parse_board)?;
    let flags = columns.parse("is_special_treatment", "boolean", parse_optional_flag)?;
    let listing = columns.parse("listing_date", "date", parse_optional_date)?;

    let instruments = (0..columns.height)
        .map(|i| Instrument {
            instrument_id: ids[i].clone(),
            name: names[i].clone(),
            board: boards[i],
            is_special_treatment: flags[i],
            listing_date: listing[i],
        })
        .collect();
    Ok(instruments)
}

/// Canonical daily-bar frame. Dates are `YYYYMMDD` strings.
pub fn daily_bars_to_dataframe(bars: &[DailyBar]) -> PolarsResult<DataFrame> {
    let numeric = |f: fn(&DailyBar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();
    DataFrame::new(vec![
        Column::new(
            "instrument_id".into(),
            bars.iter().map(|b| b.instrument_id.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "trade_date".into(),
            bars.iter()
                .map(|b| format_trade_date(b.trade_date))
                .collect::<Vec<_>>(),
        ),
        Column::new("open".into(), numeric(|b| b.open)),
        Column::new("high".into(), numeric(|b| b.high)),
        Column::new("low".into(), numeric(|b| b.low)),
        Column::new("close".into(), numeric(|b| b.close)),
        Column::new("previous_close".into(), numeric(|b| b.previous_close)),
        Column::new("volume".into(), numeric(|b| b.volume)),
        Column::new("turnover_amount".into(), numeric(|b| b.turnover_amount)),
    ])
}

/// Canonical instrument frame.
pub fn instruments_to_dataframe(instruments: &[Instrument]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "instrument_id".into(),
            instruments
                .iter()
                .map(|i| i.instrument_id.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "name".into(),
            instruments.iter().map(|i| i.name.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "board".into(),
            instruments
                .iter()
                .map(|i| i.board.as_str().to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "is_special_treatment".into(),
            instruments
                .iter()
                .map(|i| i.is_special_treatment)
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "listing_date".into(),
            instruments
                .iter()
                .map(|i| i.listing_date.map(format_trade_date))
                .collect::<Vec<_>>(),
        ),
    ])
}

fn write_parquet(mut df: DataFrame, path: &Path) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = fs::File::create(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file).finish(&mut df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote parquet");
    Ok(())
}

pub fn write_daily_bars_parquet(bars: &[DailyBar], path: &Path) -> Result<(), IngestError> {
    write_parquet(daily_bars_to_dataframe(bars)?, path)
}

pub fn write_instruments_parquet(instruments: &[Instrument], path: &Path) -> Result<(), IngestError> {
    write_parquet(instruments_to_dataframe(instruments)?, path)
}
