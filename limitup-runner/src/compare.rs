//! Side-by-side backtests of one strategy under both fill models.

use crate::metrics::FillModelSummary;
use limitup_core::backtest::{run_backtest, BacktestError, BacktestResult, CostModel};
use limitup_core::domain::{AnnotatedBar, Trade};
use limitup_core::fill::FillModel;
use limitup_core::strategy::Strategy;
use tracing::info;

/// A backtest and its headline metrics.
#[derive(Debug, Clone)]
pub struct FillModelRun {
    pub result: BacktestResult,
    pub summary: FillModelSummary,
}

impl FillModelRun {
    fn new(result: BacktestResult) -> Self {
        let summary = FillModelSummary::from_result(&result);
        Self { result, summary }
    }
}

/// Runs ordered as [`FillModel::ALL`]: IDEAL first, then CONSERVATIVE.
#[derive(Debug, Clone)]
pub struct FillModelComparison {
    pub strategy_id: String,
    pub runs: Vec<FillModelRun>,
}

impl FillModelComparison {
    pub fn run(&self, fill_model: FillModel) -> Option<&FillModelRun> {
        self.runs.iter().find(|r| r.result.fill_model == fill_model)
    }

    pub fn summaries(&self) -> Vec<FillModelSummary> {
        self.runs.iter().map(|r| r.summary.clone()).collect()
    }

    /// Every trade from every run, ordered by (entry date, instrument, fill model name).
    pub fn combined_trades(&self) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .runs
            .iter()
            .flat_map(|r| r.result.trades.iter().cloned())
            .collect();
        trades.sort_by(|a, b| {
            (a.entry_date, &a.instrument_id, a.fill_model.as_str())
                .cmp(&(b.entry_date, &b.instrument_id, b.fill_model.as_str()))
        });
        trades
    }

    /// IDEAL total return minus CONSERVATIVE total return.
    pub fn ideal_conservative_gap(&self) -> f64 {
        let total = |model| self.run(model).map_or(0.0, |r| r.summary.total_return);
        total(FillModel::Ideal) - total(FillModel::Conservative)
    }
}

/// Backtest `strategy` under IDEAL and CONSERVATIVE fills with the same costs.
pub fn compare_fill_models(
    bars: &[AnnotatedBar],
    strategy: &dyn Strategy,
    costs: &CostModel,
) -> Result<FillModelComparison, BacktestError> {
    let (ideal, conservative) = rayon::join(
        || run_backtest(bars, strategy, FillModel::Ideal, costs),
        || run_backtest(bars, strategy, FillModel::Conservative, costs),
    );
    let runs = vec![FillModelRun::new(ideal?), FillModelRun::new(conservative?)];

    for run in &runs {
        info!(
            strategy = strategy.name(),
            fill_model = %run.summary.fill_model,
            trades = run.summary.trade_count,
            total_return = run.summary.total_return,
            "backtest complete"
        );
    }
    Ok(FillModelComparison {
        strategy_id: strategy.name().to_string(),
        runs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use limitup_core::domain::{Board, DailyBar};
    use limitup_core::strategy::BuyFirstLimitUpSellNextClose;

    fn row(id: &str, day: u32, close: f64, limit_up: bool, sealed: bool) -> AnnotatedBar {
        let bar = DailyBar {
            instrument_id: id.into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            previous_close: close / 1.1,
            volume: 100.0,
            turnover_amount: close * 100.0,
        };
        let mut row = AnnotatedBar::unlabeled(bar, Board::Main, false);
        row.price_limit_applicable = true;
        row.label_limit_up = limit_up;
        row.label_sealed = sealed;
        row.label_opened = limit_up && !sealed;
        row.streak_up = u32::from(limit_up);
        row
    }

    #[test]
    fn ideal_runs_first_and_gap_reflects_blocked_fills() {
        let bars = vec![row("AAA", 2, 11.0, true, true), row("AAA", 3, 12.0, false, false)];
        let comparison =
            compare_fill_models(&bars, &BuyFirstLimitUpSellNextClose, &CostModel::frictionless())
                .unwrap();

        let models: Vec<FillModel> = comparison.runs.iter().map(|r| r.summary.fill_model).collect();
        assert_eq!(models, vec![FillModel::Ideal, FillModel::Conservative]);
        assert_eq!(comparison.run(FillModel::Ideal).unwrap().summary.trade_count, 1);
        assert_eq!(comparison.run(FillModel::Conservative).unwrap().summary.trade_count, 0);
        assert!((comparison.ideal_conservative_gap() - (12.0 / 11.0 - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn combined_trades_are_sorted() {
        // opened limit-ups are fillable under both models
        let bars = vec![
            row("BBB", 2, 11.0, true, false),
            row("AAA", 2, 11.0, true, false),
            row("BBB", 3, 11.5, false, false),
            row("AAA", 3, 11.5, false, false),
        ];
        let comparison =
            compare_fill_models(&bars, &BuyFirstLimitUpSellNextClose, &CostModel::frictionless())
                .unwrap();

        let keys: Vec<(String, FillModel)> = comparison
            .combined_trades()
            .into_iter()
            .map(|t| (t.instrument_id, t.fill_model))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAA".to_string(), FillModel::Conservative),
                ("AAA".to_string(), FillModel::Ideal),
                ("BBB".to_string(), FillModel::Conservative),
                ("BBB".to_string(), FillModel::Ideal),
            ]
        );
        assert_eq!(comparison.ideal_conservative_gap(), 0.0);
    }
}
