//! Tabular ingestion boundary: canonical daily-bar and instrument tables.

pub mod ingest;
pub mod schema;

pub use ingest::{
    daily_bars_to_dataframe, instruments_to_dataframe, read_daily_bars, read_instruments,
    write_daily_bars_parquet, write_instruments_parquet, IngestError,
};
pub use schema::{SchemaError, TableKind};
