//! LimitUp Core: labeling, streak detection and backtest simulation for limit-up events.
//!
//! This crate contains the stateful, order-sensitive heart of the system:
//! - Domain types (daily bars, instruments, annotated bars, trades)
//! - Limit-rule resolution per board / special-treatment status
//! - Per-row event labeling (limit-up, one-word, opened, sealed)
//! - Gap-aware streak tracking over the observed market calendar
//! - Row filters and forward returns
//! - Fill models, strategies and the backtest simulator
//! - The tabular ingestion boundary (CSV / Parquet)

pub mod backtest;
pub mod data;
pub mod domain;
pub mod fill;
pub mod filters;
pub mod labels;
pub mod returns;
pub mod rules;
pub mod series;
pub mod strategy;
pub mod streaks;

pub use backtest::{run_backtest, BacktestError, BacktestResult, CostModel};
pub use fill::FillModel;
pub use labels::DEFAULT_EPS;
pub use rules::{LimitRule, LimitRuleResolver, LimitRuleSet, RuleError};
pub use strategy::{strategy_by_name, ExitPriceType, Strategy};
