//! Entry/exit strategies over annotated bars.
//!
//! A strategy decides which rows to buy and when to sell. The fill model is a call
//! parameter, never strategy state, so one strategy instance can be evaluated under
//! IDEAL and CONSERVATIVE side by side (including concurrently).

pub mod first_limit_up;
pub mod non_one_word;

pub use first_limit_up::BuyFirstLimitUpSellNextClose;
pub use non_one_word::BuyNonOneWordLimitUpSellNextOpen;

use crate::domain::AnnotatedBar;
use crate::fill::FillModel;
use crate::series::{chronological_groups, scatter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which price of the exit session a position is sold at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPriceType {
    NextOpen,
    NextClose,
}

impl ExitPriceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitPriceType::NextOpen => "next_open",
            ExitPriceType::NextClose => "next_close",
        }
    }

    /// Exit-session price for this type.
    pub fn price(self, bar: &crate::domain::DailyBar) -> f64 {
        match self {
            ExitPriceType::NextOpen => bar.open,
            ExitPriceType::NextClose => bar.close,
        }
    }
}

impl fmt::Display for ExitPriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for entry/exit strategies.
///
/// Both signal vectors are aligned with `bars`: element `i` describes `bars[i]`.
pub trait Strategy: Send + Sync {
    /// Stable identifier (e.g., "buy_first_limitup_sell_next_close").
    fn name(&self) -> &str;

    fn exit_price_type(&self) -> ExitPriceType;

    /// Entry signal per row under `fill_model`.
    fn generate_entries(&self, bars: &[AnnotatedBar], fill_model: FillModel) -> Vec<bool>;

    /// Target exit date per row. `None` where there is no entry or no later session.
    ///
    /// The default sells on the instrument's next observed trade date.
    fn generate_exits(&self, bars: &[AnnotatedBar], fill_model: FillModel) -> Vec<Option<NaiveDate>> {
        let entries = self.generate_entries(bars, fill_model);
        next_trade_dates(bars)
            .into_iter()
            .zip(entries)
            .map(|(next, entry)| if entry { next } else { None })
            .collect()
    }
}

/// Next observed trade date of the same instrument for every row, in input order.
pub fn next_trade_dates(bars: &[AnnotatedBar]) -> Vec<Option<NaiveDate>> {
    let pairs = chronological_groups(bars).into_iter().flat_map(|indices| {
        indices
            .windows(2)
            .map(|pair| (pair[0], Some(bars[pair[1]].bar.trade_date)))
            .collect::<Vec<_>>()
    });
    scatter(bars.len(), None, pairs)
}

/// Names accepted by [`strategy_by_name`].
pub const STRATEGY_NAMES: [&str; 2] = [
    BuyFirstLimitUpSellNextClose::NAME,
    BuyNonOneWordLimitUpSellNextOpen::NAME,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy {0:?}; available: {names}", names = STRATEGY_NAMES.join(", "))]
pub struct UnknownStrategy(pub String);

/// Construct a strategy from its identifier.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn Strategy>, UnknownStrategy> {
    match name.trim() {
        BuyFirstLimitUpSellNextClose::NAME => Ok(Box::new(BuyFirstLimitUpSellNextClose)),
        BuyNonOneWordLimitUpSellNextOpen::NAME => Ok(Box::new(BuyNonOneWordLimitUpSellNextOpen)),
        _ => Err(UnknownStrategy(name.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::labeled_row;
    use super::*;

    #[test]
    fn next_trade_dates_follow_each_instrument() {
        let bars = vec![
            labeled_row("AAA", 4, 10.0, 10.0, false, 0, false, false),
            labeled_row("BBB", 2, 10.0, 10.0, false, 0, false, false),
            labeled_row("AAA", 2, 10.0, 10.0, false, 0, false, false),
        ];
        let next = next_trade_dates(&bars);
        assert_eq!(next[0], None);
        assert_eq!(next[1], None);
        assert_eq!(next[2], NaiveDate::from_ymd_opt(2024, 1, 4));
    }

    #[test]
    fn lookup_by_name() {
        for name in STRATEGY_NAMES {
            assert_eq!(strategy_by_name(name).unwrap().name(), name);
        }
        let err = strategy_by_name("buy_everything").err().unwrap();
        assert!(err.to_string().contains("buy_first_limitup_sell_next_close"));
    }
}
