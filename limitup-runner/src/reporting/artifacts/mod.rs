//! Artifact manager for persisting study outputs.
//!
//! Layout under the output directory:
//!
//! ```text
//! annotated.csv / annotated.parquet
//! summary.json
//! manifest.json
//! report.md
//! tables/trades.csv, tables/trades.json
//! tables/equity_<model>.csv
//! tables/strategy_compare.csv
//! tables/group_quantiles.csv
//! ```

mod annotated;
mod equity;
mod manifest;
mod stats;
mod trades;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::runner::StudyResult;
use crate::stats::GroupStatsRow;
use crate::summary::DatasetSummary;

pub use annotated::write_annotated;
pub use manifest::RunManifest;

/// Artifact paths returned after a full study export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub annotated_csv: PathBuf,
    pub annotated_parquet: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
    pub equity_csv: Vec<PathBuf>,
    pub strategy_compare_csv: PathBuf,
    pub stats: StatsPaths,
    pub manifest: PathBuf,
    pub report_markdown: PathBuf,
}

/// Paths written by a statistics-only export.
#[derive(Debug, Clone)]
pub struct StatsPaths {
    pub summary_json: PathBuf,
    pub group_quantiles_csv: PathBuf,
}

/// Manages writing all artifacts for a study.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(output_dir.join("tables")).with_context(|| {
            format!(
                "Failed to create artifact output directory {}",
                output_dir.display()
            )
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn table(&self, name: &str) -> PathBuf {
        self.output_dir.join("tables").join(name)
    }

    /// Save the dataset summary and grouped quantile table.
    pub fn save_stats(
        &self,
        summary: &DatasetSummary,
        groups: &[GroupStatsRow],
    ) -> Result<StatsPaths> {
        let summary_json = self.output_dir.join("summary.json");
        stats::write_summary_json(&summary_json, summary)?;

        let group_quantiles_csv = self.table("group_quantiles.csv");
        stats::write_group_stats_csv(&group_quantiles_csv, groups)?;

        Ok(StatsPaths {
            summary_json,
            group_quantiles_csv,
        })
    }

    /// Save the complete artifact set of a study.
    pub fn save_study(&self, study: &StudyResult) -> Result<ArtifactPaths> {
        let annotated_csv = self.output_dir.join("annotated.csv");
        let annotated_parquet = self.output_dir.join("annotated.parquet");
        write_annotated(&annotated_csv, &study.dataset)?;
        write_annotated(&annotated_parquet, &study.dataset)?;

        let combined = study.comparison.combined_trades();
        let trades_csv = self.table("trades.csv");
        let trades_json = self.table("trades.json");
        trades::write_trades_csv(&trades_csv, &combined)?;
        trades::write_trades_json(&trades_json, &combined)?;

        let mut equity_csv = Vec::with_capacity(study.comparison.runs.len());
        for run in &study.comparison.runs {
            let name = format!(
                "equity_{}.csv",
                run.result.fill_model.as_str().to_ascii_lowercase()
            );
            let path = self.table(&name);
            equity::write_equity_csv(&path, &run.result.equity_curve)?;
            equity_csv.push(path);
        }

        let strategy_compare_csv = self.table("strategy_compare.csv");
        trades::write_compare_csv(&strategy_compare_csv, &study.comparison.summaries())?;

        let stats = self.save_stats(&study.summary, &study.groups)?;

        let manifest = self.output_dir.join("manifest.json");
        manifest::write_manifest(&manifest, study)?;

        let report_markdown = self.output_dir.join("report.md");
        std::fs::write(&report_markdown, super::markdown::render_report(study)).with_context(
            || format!("Failed to write report {}", report_markdown.display()),
        )?;

        info!(dir = %self.output_dir.display(), "artifacts written");
        Ok(ArtifactPaths {
            annotated_csv,
            annotated_parquet,
            trades_csv,
            trades_json,
            equity_csv,
            strategy_compare_csv,
            stats,
            manifest,
            report_markdown,
        })
    }
}
