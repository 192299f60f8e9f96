//! Dataset-level KPIs of a prepared (labeled, filtered) dataset.

use crate::compare::FillModelComparison;
use crate::stats::quantile;
use chrono::NaiveDate;
use limitup_core::domain::AnnotatedBar;
use limitup_core::fill::FillModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub total_instruments: usize,
    pub limit_up_days: usize,
    pub limit_up_rate: f64,
    /// Share of limit-up days that closed sealed.
    pub sealed_ratio: f64,
    /// Share of limit-up days that traded at the cap all session.
    pub one_word_ratio: f64,
    /// Limit-up days a CONSERVATIVE fill would refuse.
    pub blocked_buy_days_conservative: usize,
    pub blocked_buy_ratio_conservative: f64,
    /// Median next-open return over limit-up days where it is defined; 0.0 if none are.
    pub next_open_ret_median: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// IDEAL minus CONSERVATIVE total return, present once a comparison has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_conservative_gap: Option<f64>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl DatasetSummary {
    pub fn compute(rows: &[AnnotatedBar]) -> Self {
        let limit_up: Vec<&AnnotatedBar> = rows.iter().filter(|r| r.label_limit_up).collect();
        let limit_up_days = limit_up.len();
        let sealed = limit_up.iter().filter(|r| r.label_sealed).count();
        let one_word = limit_up.iter().filter(|r| r.label_one_word).count();
        let blocked = limit_up
            .iter()
            .filter(|r| !FillModel::Conservative.can_buy(r))
            .count();

        let mut premiums: Vec<f64> = limit_up.iter().filter_map(|r| r.next_open_ret).collect();
        premiums.sort_by(f64::total_cmp);
        let next_open_ret_median = quantile(&premiums, 0.5).unwrap_or(0.0);

        let instruments: HashSet<&str> = rows.iter().map(|r| r.instrument_id()).collect();
        Self {
            total_rows: rows.len(),
            total_instruments: instruments.len(),
            limit_up_days,
            limit_up_rate: ratio(limit_up_days, rows.len()),
            sealed_ratio: ratio(sealed, limit_up_days),
            one_word_ratio: ratio(one_word, limit_up_days),
            blocked_buy_days_conservative: blocked,
            blocked_buy_ratio_conservative: ratio(blocked, limit_up_days),
            next_open_ret_median,
            start_date: rows.iter().map(|r| r.bar.trade_date).min(),
            end_date: rows.iter().map(|r| r.bar.trade_date).max(),
            ideal_conservative_gap: None,
        }
    }

    pub fn with_comparison(mut self, comparison: &FillModelComparison) -> Self {
        self.ideal_conservative_gap = Some(comparison.ideal_conservative_gap());
        self
    }
}
