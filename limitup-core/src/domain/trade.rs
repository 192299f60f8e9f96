//! Trade and EquityPoint: backtest outputs.

use crate::fill::FillModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One completed round trip: bought at an entry session's close, sold on the exit date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub strategy_id: String,
    pub fill_model: FillModel,
    pub instrument_id: String,

    // ── Entry ──
    pub entry_date: NaiveDate,
    /// Cost-adjusted entry price.
    pub entry_price: f64,

    // ── Exit ──
    pub exit_date: NaiveDate,
    /// Cost-adjusted exit price.
    pub exit_price: f64,

    pub net_return: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_return > 0.0
    }
}

/// Portfolio equity at the end of a trade date. Starts from 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub trade_date: NaiveDate,
    pub equity: f64,
}
