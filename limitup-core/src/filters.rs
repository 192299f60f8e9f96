//! Row filters: IPO grace-period days and suspension days.
//!
//! Both filters keep surviving rows untouched and in their original order.

use crate::domain::{BarRow, InstrumentTable};
use crate::rules::LimitRuleResolver;
use tracing::debug;

/// Drop rows on which price limits are not in force.
///
/// Rows that already carry an applicability flag (annotated bars) are judged by it;
/// raw bars are resolved against `instruments` and `resolver`.
pub fn exclude_unlimited_days<T: BarRow>(
    rows: Vec<T>,
    instruments: &InstrumentTable,
    resolver: &LimitRuleResolver,
) -> Vec<T> {
    let before = rows.len();
    let kept: Vec<T> = rows
        .into_iter()
        .filter(|row| {
            row.price_limit_applicable().unwrap_or_else(|| {
                let bar = row.bar();
                let profile = instruments.profile(&bar.instrument_id);
                resolver.is_price_limit_applicable(&profile, bar.trade_date)
            })
        })
        .collect();
    debug!(before, after = kept.len(), "excluded unlimited days");
    kept
}

/// Drop rows with non-positive or missing volume.
pub fn exclude_suspended<T: BarRow>(rows: Vec<T>) -> Vec<T> {
    let before = rows.len();
    let kept: Vec<T> = rows.into_iter().filter(|row| row.bar().is_traded()).collect();
    debug!(before, after = kept.len(), "excluded suspended days");
    kept
}
