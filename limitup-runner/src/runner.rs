//! Study runner: wires together loading, the labeling pipeline, the fill-model
//! comparison, grouped statistics and the dataset summary.
//!
//! Two entry points:
//! - `run_study()`: loads inputs and rules named by a [`RunConfig`], then runs. Used by the CLI.
//! - `run_study_from_data()`: takes pre-loaded inputs and an explicit resolver. No I/O.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use limitup_core::backtest::{BacktestError, CostModel};
use limitup_core::domain::AnnotatedBar;
use limitup_core::rules::{LimitRuleResolver, RuleError};
use limitup_core::strategy::{strategy_by_name, Strategy, UnknownStrategy};

use crate::compare::{compare_fill_models, FillModelComparison};
use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_inputs, LoadError, LoadedData};
use crate::pipeline::prepare_dataset;
use crate::stats::{group_stats, GroupStatsRow, REPORT_GROUP_KEYS};
use crate::summary::DatasetSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("rule error: {0}")]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Settings that shape a study once the inputs are in memory.
pub struct StudySettings<'a> {
    pub strategy: &'a dyn Strategy,
    pub costs: CostModel,
    pub eps: f64,
    pub run_id: String,
}

/// Complete result of one study run.
#[derive(Debug, Clone)]
pub struct StudyResult {
    pub run_id: String,
    pub dataset_hash: String,
    pub rule_source: Option<PathBuf>,
    pub eps: f64,
    pub costs: CostModel,
    /// Raw bar count before filtering.
    pub input_rows: usize,
    /// Labeled, filtered dataset with streaks and forward returns.
    pub dataset: Vec<AnnotatedBar>,
    pub comparison: FillModelComparison,
    pub summary: DatasetSummary,
    pub groups: Vec<GroupStatsRow>,
}

/// Run a study from a [`RunConfig`] (loads inputs and rules from disk).
pub fn run_study(config: &RunConfig) -> Result<StudyResult, RunError> {
    config.validate()?;
    let loaded = load_inputs(&config.data.daily, &config.data.instruments)?;
    let resolver = LimitRuleResolver::from_path(config.rules.path.as_deref())?;
    let strategy = strategy_by_name(&config.backtest.strategy)?;

    let settings = StudySettings {
        strategy: strategy.as_ref(),
        costs: config.backtest.costs(),
        eps: config.rules.eps,
        run_id: config.run_id(),
    };
    run_study_from_data(loaded, &resolver, &settings)
}

/// Run a study over pre-loaded inputs: no I/O.
pub fn run_study_from_data(
    loaded: LoadedData,
    resolver: &LimitRuleResolver,
    settings: &StudySettings<'_>,
) -> Result<StudyResult, RunError> {
    let LoadedData {
        bars,
        instruments,
        dataset_hash,
    } = loaded;
    let input_rows = bars.len();

    let dataset = prepare_dataset(bars, &instruments, resolver, settings.eps);
    let comparison = compare_fill_models(&dataset, settings.strategy, &settings.costs)?;
    let groups = group_stats(&dataset, &REPORT_GROUP_KEYS);
    let summary = DatasetSummary::compute(&dataset).with_comparison(&comparison);

    info!(
        run_id = %&settings.run_id[..settings.run_id.len().min(12)],
        rows = dataset.len(),
        limit_up = summary.limit_up_days,
        groups = groups.len(),
        "study complete"
    );

    Ok(StudyResult {
        run_id: settings.run_id.clone(),
        dataset_hash,
        rule_source: resolver.source().map(|p| p.to_path_buf()),
        eps: settings.eps,
        costs: settings.costs,
        input_rows,
        dataset,
        comparison,
        summary,
        groups,
    })
}
