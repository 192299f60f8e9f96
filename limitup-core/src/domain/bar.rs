//! DailyBar: one instrument's session on one trade date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single instrument.
///
/// `previous_close` is the exchange's reference close used for the price cap,
/// which is not always the prior row's `close` (ex-dividend days, suspensions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub instrument_id: String,
    pub trade_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub previous_close: f64,
    pub volume: f64,
    pub turnover_amount: f64,
}

impl DailyBar {
    /// A bar with non-positive (or missing) volume is a suspension day.
    pub fn is_traded(&self) -> bool {
        self.volume > 0.0
    }
}

/// Anything that wraps a `DailyBar` and can flow through the row-level stages.
///
/// Raw bars answer `None` for price-limit applicability; annotated rows carry
/// the flag computed by the labeler.
pub trait BarRow {
    fn bar(&self) -> &DailyBar;

    fn price_limit_applicable(&self) -> Option<bool> {
        None
    }
}

impl BarRow for DailyBar {
    fn bar(&self) -> &DailyBar {
        self
    }
}
