//! Per-instrument chronological ordering shared by the sequential stages.

use crate::domain::BarRow;
use std::collections::BTreeMap;

/// Row indices grouped by instrument, each group in ascending trade-date order.
///
/// Rows with the same instrument and date keep their input order (stable sort on
/// `(trade_date, row index)`). Groups are ordered by instrument id.
pub fn chronological_groups<T: BarRow>(rows: &[T]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        groups
            .entry(row.bar().instrument_id.as_str())
            .or_default()
            .push(idx);
    }
    groups
        .into_values()
        .map(|mut indices| {
            indices.sort_by_key(|&idx| (rows[idx].bar().trade_date, idx));
            indices
        })
        .collect()
}

/// Scatter `(row index, value)` pairs back into input order.
pub(crate) fn scatter<V: Clone>(len: usize, fill: V, pairs: impl IntoIterator<Item = (usize, V)>) -> Vec<V> {
    let mut out = vec![fill; len];
    for (idx, value) in pairs {
        out[idx] = value;
    }
    out
}
