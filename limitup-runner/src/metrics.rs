//! Performance metrics: pure functions over an equity curve and trade list.

use limitup_core::domain::{EquityPoint, Trade};
use limitup_core::fill::FillModel;
use limitup_core::BacktestResult;
use serde::{Deserialize, Serialize};

/// One row of the fill-model comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillModelSummary {
    pub fill_model: FillModel,
    pub trade_count: usize,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}

impl FillModelSummary {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            fill_model: result.fill_model,
            trade_count: result.trades.len(),
            total_return: total_return(&result.equity_curve),
            max_drawdown: max_drawdown(&result.equity_curve),
            win_rate: win_rate(&result.trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Final equity minus one; 0.0 for an empty curve.
///
/// Curves start from a notional 1.0 before the first point.
pub fn total_return(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve.last().map_or(0.0, |p| p.equity - 1.0)
}

/// Maximum drawdown as a non-positive fraction (e.g. -0.25 for a 25% drawdown).
///
/// The running peak starts at the first point; 0.0 for an empty curve.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            worst = worst.min(point.equity / peak - 1.0);
        }
    }
    worst
}

/// Fraction of trades with a strictly positive net return; 0.0 when there are none.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}
