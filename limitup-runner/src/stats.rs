//! Grouped distribution statistics of forward returns.
//!
//! Rows are bucketed by a chosen set of keys; each bucket reports its size and,
//! per return column, the mean and the 10th/50th/90th percentiles.

use limitup_core::domain::{AnnotatedBar, Board};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// A column rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Board,
    #[serde(rename = "is_st")]
    IsSpecialTreatment,
    StreakUp,
    OneWord,
    Opened,
}

/// Grouping used when the caller asks for none.
pub const DEFAULT_GROUP_KEYS: [GroupKey; 5] = [
    GroupKey::Board,
    GroupKey::IsSpecialTreatment,
    GroupKey::StreakUp,
    GroupKey::OneWord,
    GroupKey::Opened,
];

/// Grouping of the exported quantile table.
pub const REPORT_GROUP_KEYS: [GroupKey; 3] =
    [GroupKey::StreakUp, GroupKey::OneWord, GroupKey::Opened];

impl GroupKey {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKey::Board => "board",
            GroupKey::IsSpecialTreatment => "is_st",
            GroupKey::StreakUp => "streak_up",
            GroupKey::OneWord => "one_word",
            GroupKey::Opened => "opened",
        }
    }

    fn value(self, row: &AnnotatedBar) -> GroupValue {
        match self {
            GroupKey::Board => GroupValue::Board(row.board),
            GroupKey::IsSpecialTreatment => GroupValue::Flag(row.is_special_treatment),
            GroupKey::StreakUp => GroupValue::Streak(row.streak_up),
            GroupKey::OneWord => GroupValue::Flag(row.label_one_word),
            GroupKey::Opened => GroupValue::Flag(row.label_opened),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown group key '{0}' (expected board, is_st, streak_up, one_word or opened)")]
pub struct ParseGroupKeyError(pub String);

impl FromStr for GroupKey {
    type Err = ParseGroupKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "board" => Ok(GroupKey::Board),
            "is_st" | "is_special_treatment" => Ok(GroupKey::IsSpecialTreatment),
            "streak_up" => Ok(GroupKey::StreakUp),
            "one_word" => Ok(GroupKey::OneWord),
            "opened" => Ok(GroupKey::Opened),
            _ => Err(ParseGroupKeyError(s.to_string())),
        }
    }
}

/// The value of one grouping column for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Board(Board),
    Flag(bool),
    Streak(u32),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Board(board) => write!(f, "{board}"),
            GroupValue::Flag(flag) => write!(f, "{flag}"),
            GroupValue::Streak(streak) => write!(f, "{streak}"),
        }
    }
}

/// Mean and percentiles of one return column; `None` when the bucket has no defined value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub mean: Option<f64>,
    pub p10: Option<f64>,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
}

impl ReturnStats {
    fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(f64::total_cmp);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self {
            mean: Some(mean),
            p10: quantile(&values, 0.1),
            p50: quantile(&values, 0.5),
            p90: quantile(&values, 0.9),
        }
    }
}

/// One output bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatsRow {
    pub keys: Vec<(GroupKey, GroupValue)>,
    pub count: usize,
    pub next_open_ret: ReturnStats,
    pub next_close_ret: ReturnStats,
}

/// Linear-interpolation quantile of an ascending slice; `None` when it is empty.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Group rows by `by` (or [`DEFAULT_GROUP_KEYS`] when empty) and summarise returns.
///
/// Rows whose next-open and next-close returns are both undefined are left out.
/// Buckets come back sorted by key values, so the result does not depend on row order.
pub fn group_stats(rows: &[AnnotatedBar], by: &[GroupKey]) -> Vec<GroupStatsRow> {
    let keys: &[GroupKey] = if by.is_empty() { &DEFAULT_GROUP_KEYS } else { by };

    let mut buckets: BTreeMap<Vec<GroupValue>, Vec<&AnnotatedBar>> = BTreeMap::new();
    for row in rows {
        if row.next_open_ret.is_none() && row.next_close_ret.is_none() {
            continue;
        }
        let values = keys.iter().map(|k| k.value(row)).collect();
        buckets.entry(values).or_default().push(row);
    }

    let stats: Vec<GroupStatsRow> = buckets
        .into_iter()
        .map(|(values, members)| {
            let column = |pick: fn(&AnnotatedBar) -> Option<f64>| {
                ReturnStats::from_values(members.iter().filter_map(|r| pick(r)).collect())
            };
            GroupStatsRow {
                keys: keys.iter().copied().zip(values).collect(),
                count: members.len(),
                next_open_ret: column(|r| r.next_open_ret),
                next_close_ret: column(|r| r.next_close_ret),
            }
        })
        .collect();
    debug!(groups = stats.len(), keys = keys.len(), "computed group stats");
    stats
}
