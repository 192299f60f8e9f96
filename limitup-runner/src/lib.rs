//! LimitUp Runner: study orchestration, fill-model comparison, statistics, artifacts.
//!
//! This crate builds on `limitup-core` to provide:
//! - Run configuration (TOML) with content-hashed run ids
//! - Input loading with a BLAKE3 dataset fingerprint
//! - The labeling pipeline (labels, filters, streaks, forward returns)
//! - Side-by-side IDEAL / CONSERVATIVE backtests and their metrics
//! - Grouped forward-return quantiles and dataset-level KPIs
//! - Artifact export (CSV, Parquet, JSON, markdown)

pub mod compare;
pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod pipeline;
pub mod reporting;
pub mod runner;
pub mod stats;
pub mod summary;

pub use compare::{compare_fill_models, FillModelComparison, FillModelRun};
pub use config::{ConfigError, RunConfig};
pub use data_loader::{load_inputs, LoadError, LoadedData};
pub use metrics::FillModelSummary;
pub use pipeline::prepare_dataset;
pub use reporting::{ArtifactManager, ArtifactPaths};
pub use runner::{run_study, run_study_from_data, RunError, StudyResult, StudySettings};
pub use stats::{group_stats, GroupKey, GroupStatsRow, GroupValue};
pub use summary::DatasetSummary;
