//! The labeling pipeline: label, filter, sequence, look forward.

use limitup_core::domain::{AnnotatedBar, DailyBar, InstrumentTable};
use limitup_core::filters::{exclude_suspended, exclude_unlimited_days};
use limitup_core::labels::label_bars;
use limitup_core::returns::apply_forward_returns;
use limitup_core::rules::LimitRuleResolver;
use limitup_core::streaks::apply_streaks;
use tracing::info;

/// Produce the analysis dataset from raw bars.
///
/// Stages run in a fixed order: labels, IPO grace-period exclusion, suspension
/// exclusion, streaks, forward returns. Streaks and returns therefore only see
/// rows that survived both filters.
pub fn prepare_dataset(
    bars: Vec<DailyBar>,
    instruments: &InstrumentTable,
    resolver: &LimitRuleResolver,
    eps: f64,
) -> Vec<AnnotatedBar> {
    let input = bars.len();
    let labeled = label_bars(bars, instruments, resolver, eps);
    let limited = exclude_unlimited_days(labeled, instruments, resolver);
    let mut rows = exclude_suspended(limited);
    apply_streaks(&mut rows);
    apply_forward_returns(&mut rows);

    info!(
        input,
        output = rows.len(),
        limit_up = rows.iter().filter(|r| r.label_limit_up).count(),
        "prepared dataset"
    );
    rows
}
