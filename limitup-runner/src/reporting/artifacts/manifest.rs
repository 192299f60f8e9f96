//! Run manifest export (JSON).

use anyhow::{Context, Result};
use limitup_core::backtest::CostModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runner::{StudyResult, SCHEMA_VERSION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub strategy: String,
    pub costs: CostModel,
    /// Rule override file; `None` means built-in defaults.
    pub rule_source: Option<PathBuf>,
    pub eps: f64,
    pub dataset_hash: String,
    pub input_rows: usize,
    pub dataset_rows: usize,
    pub trade_counts: Vec<(String, usize)>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunManifest {
    pub fn from_study(study: &StudyResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: study.run_id.clone(),
            timestamp: chrono::Utc::now(),
            strategy: study.comparison.strategy_id.clone(),
            costs: study.costs,
            rule_source: study.rule_source.clone(),
            eps: study.eps,
            dataset_hash: study.dataset_hash.clone(),
            input_rows: study.input_rows,
            dataset_rows: study.dataset.len(),
            trade_counts: study
                .comparison
                .runs
                .iter()
                .map(|r| (r.summary.fill_model.to_string(), r.summary.trade_count))
                .collect(),
        }
    }
}

pub fn write_manifest(path: &Path, study: &StudyResult) -> Result<()> {
    let manifest = RunManifest::from_study(study);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
