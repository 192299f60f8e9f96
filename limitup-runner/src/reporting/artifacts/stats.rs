//! Summary JSON and grouped quantile table export.

use anyhow::{Context, Result};
use std::path::Path;

use crate::stats::{GroupStatsRow, ReturnStats};
use crate::summary::DatasetSummary;

pub fn write_summary_json(path: &Path, summary: &DatasetSummary) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summary).context("Failed to serialize dataset summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary {}", path.display()))?;
    Ok(())
}

fn push_stats(record: &mut Vec<String>, stats: &ReturnStats) {
    for value in [stats.mean, stats.p10, stats.p50, stats.p90] {
        record.push(value.map(|v| format!("{v:.6}")).unwrap_or_default());
    }
}

/// One column per group key, then `count` and mean/p10/p50/p90 per return column.
pub fn write_group_stats_csv(path: &Path, groups: &[GroupStatsRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create group stats CSV {}", path.display()))?;

    let mut header: Vec<String> = groups
        .first()
        .map(|g| g.keys.iter().map(|(k, _)| k.as_str().to_string()).collect())
        .unwrap_or_default();
    header.push("count".to_string());
    for column in ["next_open_ret", "next_close_ret"] {
        for metric in ["mean", "p10", "p50", "p90"] {
            header.push(format!("{column}_{metric}"));
        }
    }
    wtr.write_record(&header)?;

    for group in groups {
        let mut record: Vec<String> = group.keys.iter().map(|(_, v)| v.to_string()).collect();
        record.push(group.count.to_string());
        push_stats(&mut record, &group.next_open_ret);
        push_stats(&mut record, &group.next_close_ret);
        wtr.write_record(&record)?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush group stats CSV {}", path.display()))?;
    Ok(())
}
