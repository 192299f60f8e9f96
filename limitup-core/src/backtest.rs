//! Backtest simulator: entry signals → trades → equity curve.
//!
//! A run is a pure function of (bars, strategy, fill model, costs). Nothing is
//! cached between calls, so the same strategy can be run under several fill models
//! concurrently.

use crate::domain::{AnnotatedBar, DailyBar, EquityPoint, Trade};
use crate::fill::FillModel;
use crate::strategy::Strategy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("strategy {strategy} produced {signal} signal of length {actual}, expected {expected}")]
    SignalLengthMismatch {
        strategy: String,
        signal: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid entry price {price} for {instrument_id} on {trade_date}")]
    InvalidEntryPrice {
        instrument_id: String,
        trade_date: NaiveDate,
        price: f64,
    },

    #[error("invalid cost assumption: {0}")]
    InvalidCost(String),
}

/// Round-trip transaction costs in basis points, charged on both legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub fee_bps: f64,
    pub slippage_bps: f64,
}

impl CostModel {
    pub fn new(fee_bps: f64, slippage_bps: f64) -> Self {
        Self {
            fee_bps,
            slippage_bps,
        }
    }

    pub fn frictionless() -> Self {
        Self::default()
    }

    pub fn total_bps(&self) -> f64 {
        self.fee_bps + self.slippage_bps
    }

    /// Buyers pay up.
    pub fn entry_price(&self, base: f64) -> f64 {
        base * (1.0 + self.total_bps() / 10_000.0)
    }

    /// Sellers receive less.
    pub fn exit_price(&self, base: f64) -> f64 {
        base * (1.0 - self.total_bps() / 10_000.0)
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        for (name, value) in [("fee_bps", self.fee_bps), ("slippage_bps", self.slippage_bps)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BacktestError::InvalidCost(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.total_bps() >= 10_000.0 {
            return Err(BacktestError::InvalidCost(format!(
                "total cost of {} bps would consume the whole exit price",
                self.total_bps()
            )));
        }
        Ok(())
    }
}

/// Output of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_id: String,
    pub fill_model: FillModel,
    pub costs: CostModel,
    /// Sorted by `(entry_date, instrument_id)`.
    pub trades: Vec<Trade>,
    /// One point per distinct trade date in the input, ascending.
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().map_or(1.0, |p| p.equity)
    }
}

/// `(instrument, date)` → bar. On duplicate keys the last row in
/// `(instrument, date, row index)` order wins.
struct PriceIndex<'a> {
    by_key: HashMap<(&'a str, NaiveDate), &'a DailyBar>,
}

impl<'a> PriceIndex<'a> {
    fn build(bars: &'a [AnnotatedBar]) -> Self {
        // Row order already ascends within equal keys, so plain insertion keeps the last.
        let mut by_key = HashMap::with_capacity(bars.len());
        for row in bars {
            by_key.insert((row.bar.instrument_id.as_str(), row.bar.trade_date), &row.bar);
        }
        Self { by_key }
    }

    fn get(&self, instrument_id: &str, date: NaiveDate) -> Option<&'a DailyBar> {
        self.by_key.get(&(instrument_id, date)).copied()
    }
}

/// Run `strategy` over `bars` under `fill_model` and `costs`.
pub fn run_backtest(
    bars: &[AnnotatedBar],
    strategy: &dyn Strategy,
    fill_model: FillModel,
    costs: &CostModel,
) -> Result<BacktestResult, BacktestError> {
    costs.validate()?;

    let entries = strategy.generate_entries(bars, fill_model);
    let exits = strategy.generate_exits(bars, fill_model);
    check_length(strategy, "entry", bars.len(), entries.len())?;
    check_length(strategy, "exit", bars.len(), exits.len())?;

    let prices = PriceIndex::build(bars);
    let exit_price_type = strategy.exit_price_type();

    let mut trades = Vec::new();
    let mut unresolved = 0usize;
    for ((row, entry), exit_date) in bars.iter().zip(entries).zip(exits) {
        if !entry {
            continue;
        }
        let Some(exit_bar) = exit_date.and_then(|date| prices.get(&row.bar.instrument_id, date))
        else {
            unresolved += 1;
            continue;
        };

        let base_entry = fill_model.entry_price(row);
        if !base_entry.is_finite() || base_entry <= 0.0 {
            return Err(BacktestError::InvalidEntryPrice {
                instrument_id: row.bar.instrument_id.clone(),
                trade_date: row.bar.trade_date,
                price: base_entry,
            });
        }
        let entry_price = costs.entry_price(base_entry);
        let exit_price = costs.exit_price(exit_price_type.price(exit_bar));

        trades.push(Trade {
            strategy_id: strategy.name().to_string(),
            fill_model,
            instrument_id: row.bar.instrument_id.clone(),
            entry_date: row.bar.trade_date,
            entry_price,
            exit_date: exit_bar.trade_date,
            exit_price,
            net_return: exit_price / entry_price - 1.0,
        });
    }

    trades.sort_by(|a, b| {
        a.entry_date
            .cmp(&b.entry_date)
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
    let equity_curve = build_equity_curve(bars, &trades);

    debug!(
        strategy = strategy.name(),
        fill_model = %fill_model,
        trades = trades.len(),
        unresolved_exits = unresolved,
        "backtest complete"
    );

    Ok(BacktestResult {
        strategy_id: strategy.name().to_string(),
        fill_model,
        costs: *costs,
        trades,
        equity_curve,
    })
}

fn check_length(
    strategy: &dyn Strategy,
    signal: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), BacktestError> {
    if expected == actual {
        Ok(())
    } else {
        Err(BacktestError::SignalLengthMismatch {
            strategy: strategy.name().to_string(),
            signal,
            expected,
            actual,
        })
    }
}

/// Equity starting at 1.0, compounded on each trade's exit date, sampled on every
/// distinct trade date present in `bars`.
pub fn build_equity_curve(bars: &[AnnotatedBar], trades: &[Trade]) -> Vec<EquityPoint> {
    let mut calendar: BTreeMap<NaiveDate, f64> =
        bars.iter().map(|row| (row.bar.trade_date, 1.0)).collect();
    for trade in trades {
        if let Some(growth) = calendar.get_mut(&trade.exit_date) {
            *growth *= 1.0 + trade.net_return;
        }
    }

    let mut equity = 1.0;
    calendar
        .into_iter()
        .map(|(trade_date, growth)| {
            equity *= growth;
            EquityPoint { trade_date, equity }
        })
        .collect()
}
