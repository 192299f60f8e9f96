//! End-to-end scenarios through the core stages: raw bars → labels → filters →
//! streaks → forward returns → backtest.

use chrono::NaiveDate;
use limitup_core::backtest::{run_backtest, CostModel};
use limitup_core::domain::{AnnotatedBar, Board, DailyBar, Instrument, InstrumentTable};
use limitup_core::filters::{exclude_suspended, exclude_unlimited_days};
use limitup_core::labels::{label_bars, DEFAULT_EPS};
use limitup_core::returns::apply_forward_returns;
use limitup_core::rules::LimitRuleResolver;
use limitup_core::strategy::BuyFirstLimitUpSellNextClose;
use limitup_core::streaks::apply_streaks;
use limitup_core::FillModel;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn bar(id: &str, d: u32, open: f64, high: f64, low: f64, close: f64, previous_close: f64, volume: f64) -> DailyBar {
    DailyBar {
        instrument_id: id.into(),
        trade_date: date(d),
        open,
        high,
        low,
        close,
        previous_close,
        volume,
        turnover_amount: volume * close,
    }
}

fn instruments() -> InstrumentTable {
    InstrumentTable::new(vec![
        Instrument {
            instrument_id: "AAA".into(),
            name: Some("Alpha".into()),
            board: Board::Main,
            is_special_treatment: false,
            listing_date: None,
        },
        Instrument {
            instrument_id: "BBB".into(),
            name: None,
            board: Board::Star,
            is_special_treatment: false,
            listing_date: Some(date(1)),
        },
        Instrument {
            instrument_id: "CCC".into(),
            name: None,
            board: Board::Main,
            is_special_treatment: false,
            listing_date: None,
        },
    ])
}

fn prepare(bars: Vec<DailyBar>) -> Vec<AnnotatedBar> {
    let table = instruments();
    let resolver = LimitRuleResolver::default();
    let labeled = label_bars(bars, &table, &resolver, DEFAULT_EPS);
    let mut rows = exclude_suspended(exclude_unlimited_days(labeled, &table, &resolver));
    apply_streaks(&mut rows);
    apply_forward_returns(&mut rows);
    rows
}

#[test]
fn first_limit_up_scenario_with_and_without_costs() {
    let rows = prepare(vec![
        bar("AAA", 2, 10.80, 11.00, 10.50, 11.00, 10.00, 1_000.0),
        bar("AAA", 3, 11.20, 11.60, 11.10, 11.50, 11.00, 800.0),
    ]);
    assert!(rows[0].label_limit_up);
    assert!(rows[0].label_opened);
    assert!(!rows[0].label_sealed);
    assert_eq!(rows[0].streak_up, 1);

    let strategy = BuyFirstLimitUpSellNextClose;
    let free = run_backtest(&rows, &strategy, FillModel::Conservative, &CostModel::frictionless()).unwrap();
    assert_eq!(free.trades.len(), 1);
    assert!((free.trades[0].net_return - 0.045_454_545).abs() < 1e-6);

    let costly = run_backtest(&rows, &strategy, FillModel::Conservative, &CostModel::new(10.0, 10.0)).unwrap();
    assert_eq!(costly.trades.len(), 1);
    assert!(costly.trades[0].net_return < free.trades[0].net_return);
    assert!(costly.final_equity() < free.final_equity());
}

#[test]
fn one_word_first_day_only_tradable_when_ideal() {
    let rows = prepare(vec![
        bar("AAA", 2, 11.00, 11.00, 11.00, 11.00, 10.00, 1_000.0),
        bar("AAA", 3, 11.20, 11.60, 11.10, 11.50, 11.00, 800.0),
    ]);
    assert!(rows[0].label_one_word && rows[0].label_sealed);

    let strategy = BuyFirstLimitUpSellNextClose;
    let ideal = run_backtest(&rows, &strategy, FillModel::Ideal, &CostModel::frictionless()).unwrap();
    let conservative =
        run_backtest(&rows, &strategy, FillModel::Conservative, &CostModel::frictionless()).unwrap();
    assert_eq!(ideal.trades.len(), 1);
    assert!(conservative.trades.is_empty());
}

#[test]
fn filters_drop_ipo_window_and_suspensions() {
    let rows = prepare(vec![
        bar("AAA", 2, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0),
        bar("BBB", 3, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0),
        bar("BBB", 6, 10.0, 10.0, 10.0, 10.0, 10.0, 0.0),
        bar("BBB", 7, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0),
    ]);
    let keys: Vec<(&str, NaiveDate)> = rows
        .iter()
        .map(|r| (r.bar.instrument_id.as_str(), r.bar.trade_date))
        .collect();
    assert_eq!(keys, vec![("AAA", date(2)), ("BBB", date(7))]);
}

#[test]
fn suspension_gap_breaks_streak_after_filtering() {
    // AAA limit-up on the 2nd and 4th; suspended (zero volume) on the 3rd while CCC trades.
    let rows = prepare(vec![
        bar("AAA", 2, 10.5, 11.0, 10.4, 11.0, 10.0, 100.0),
        bar("AAA", 3, 11.0, 11.0, 11.0, 11.0, 11.0, 0.0),
        bar("CCC", 3, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0),
        bar("AAA", 4, 11.5, 12.1, 11.4, 12.1, 11.0, 100.0),
    ]);
    let aaa: Vec<u32> = rows
        .iter()
        .filter(|r| r.bar.instrument_id == "AAA")
        .map(|r| r.streak_up)
        .collect();
    assert_eq!(aaa, vec![1, 1]);
    assert!(rows
        .iter()
        .any(|r| r.bar.instrument_id == "CCC" && r.bar.trade_date == date(3)));
}

#[test]
fn calendar_without_the_gap_day_keeps_the_streak() {
    // Nobody trades on the 3rd once AAA's suspension and BBB's IPO day are filtered.
    let rows = prepare(vec![
        bar("AAA", 2, 10.5, 11.0, 10.4, 11.0, 10.0, 100.0),
        bar("AAA", 3, 11.0, 11.0, 11.0, 11.0, 11.0, 0.0),
        bar("BBB", 3, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0),
        bar("AAA", 4, 11.5, 12.1, 11.4, 12.1, 11.0, 100.0),
    ]);
    let aaa: Vec<u32> = rows
        .iter()
        .filter(|r| r.bar.instrument_id == "AAA")
        .map(|r| r.streak_up)
        .collect();
    assert_eq!(aaa, vec![1, 2]);
}
