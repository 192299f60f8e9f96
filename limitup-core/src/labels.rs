//! Event labeler: limit price and the four per-day limit-up labels.
//!
//! Labeling is a pure per-row map. Nothing here looks at neighbouring rows, so
//! the result does not depend on input order and re-labeling is idempotent.

use crate::domain::{AnnotatedBar, DailyBar, InstrumentTable};
use crate::rules::{compute_limit_price, LimitRuleResolver};
use tracing::{debug, warn};

/// Absolute tolerance for "at the limit price" comparisons.
pub const DEFAULT_EPS: f64 = 1e-6;

/// The label set for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitLabels {
    pub limit_up: bool,
    pub one_word: bool,
    pub opened: bool,
    pub sealed: bool,
}

fn at_limit(value: f64, limit: f64, eps: f64) -> bool {
    (value - limit).abs() <= eps
}

/// Classify a bar against its limit price.
///
/// A missing limit price (non-finite previous close) or an inapplicable day yields
/// no labels at all.
pub fn classify(bar: &DailyBar, limit_up_price: Option<f64>, applicable: bool, eps: f64) -> LimitLabels {
    let Some(limit) = limit_up_price else {
        return LimitLabels::default();
    };
    if !applicable {
        return LimitLabels::default();
    }

    let high_at_limit = at_limit(bar.high, limit, eps);
    let limit_up = at_limit(bar.close, limit, eps) && high_at_limit;
    let one_word = limit_up && at_limit(bar.open, limit, eps) && at_limit(bar.low, limit, eps);
    let opened = high_at_limit && bar.low < limit - eps;

    LimitLabels {
        limit_up,
        one_word,
        opened,
        sealed: limit_up && !opened,
    }
}

/// Label a single bar using its instrument's resolved rule.
pub fn label_bar(
    bar: DailyBar,
    instruments: &InstrumentTable,
    resolver: &LimitRuleResolver,
    eps: f64,
) -> AnnotatedBar {
    let profile = instruments.profile(&bar.instrument_id);
    let rule = resolver.resolve(&profile);
    let limit_up_price = compute_limit_price(bar.previous_close, rule.limit_up);
    let applicable = resolver.is_price_limit_applicable(&profile, bar.trade_date);
    let labels = classify(&bar, limit_up_price, applicable, eps);

    let mut row = AnnotatedBar::unlabeled(bar, profile.board, profile.is_special_treatment);
    row.limit_up_price = limit_up_price;
    row.price_limit_applicable = applicable;
    row.label_limit_up = labels.limit_up;
    row.label_one_word = labels.one_word;
    row.label_opened = labels.opened;
    row.label_sealed = labels.sealed;
    row
}

/// Label every bar, preserving input order. Streak and forward returns are left unset.
pub fn label_bars(
    bars: impl IntoIterator<Item = DailyBar>,
    instruments: &InstrumentTable,
    resolver: &LimitRuleResolver,
    eps: f64,
) -> Vec<AnnotatedBar> {
    let mut unknown = 0usize;
    let rows: Vec<AnnotatedBar> = bars
        .into_iter()
        .map(|bar| {
            if instruments.get(&bar.instrument_id).is_none() {
                unknown += 1;
            }
            label_bar(bar, instruments, resolver, eps)
        })
        .collect();

    if unknown > 0 {
        warn!(
            rows = unknown,
            "bars reference instruments missing from the instrument table; labeled as UNKNOWN"
        );
    }
    debug!(
        rows = rows.len(),
        limit_up = rows.iter().filter(|r| r.label_limit_up).count(),
        "labeled bars"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, Instrument};
    use chrono::NaiveDate;

    fn bar(id: &str, date: (i32, u32, u32), ohlc: [f64; 4], previous_close: f64) -> DailyBar {
        DailyBar {
            instrument_id: id.into(),
            trade_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            open: ohlc[0],
            high: ohlc[1],
            low: ohlc[2],
            close: ohlc[3],
            previous_close,
            volume: 1_000.0,
            turnover_amount: 10_000.0,
        }
    }

    fn table() -> InstrumentTable {
        InstrumentTable::new(vec![
            Instrument {
                instrument_id: "AAA".into(),
                name: None,
                board: Board::Main,
                is_special_treatment: false,
                listing_date: None,
            },
            Instrument {
                instrument_id: "STX".into(),
                name: Some("ST Example".into()),
                board: Board::Main,
                is_special_treatment: true,
                listing_date: None,
            },
            Instrument {
                instrument_id: "NEW".into(),
                name: None,
                board: Board::Star,
                is_special_treatment: false,
                listing_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            },
        ])
    }

    fn label(b: DailyBar) -> AnnotatedBar {
        label_bar(b, &table(), &LimitRuleResolver::default(), DEFAULT_EPS)
    }

    #[test]
    fn opened_limit_up_day() {
        let row = label(bar("AAA", (2024, 1, 2), [10.5, 11.0, 10.2, 11.0], 10.0));
        assert_eq!(row.limit_up_price, Some(11.0));
        assert!(row.label_limit_up);
        assert!(row.label_opened);
        assert!(!row.label_sealed);
        assert!(!row.label_one_word);
    }

    #[test]
    fn one_word_day_is_sealed() {
        let row = label(bar("AAA", (2024, 1, 2), [11.0, 11.0, 11.0, 11.0], 10.0));
        assert!(row.label_limit_up);
        assert!(row.label_one_word);
        assert!(row.label_sealed);
        assert!(!row.label_opened);
    }

    #[test]
    fn close_at_limit_without_high_is_not_limit_up() {
        // high above the cap only happens with bad data, but close alone must not count
        let row = label(bar("AAA", (2024, 1, 2), [10.5, 11.2, 10.2, 11.0], 10.0));
        assert!(!row.label_limit_up);
        assert!(!row.label_sealed);
    }

    #[test]
    fn touched_but_closed_below_is_opened_only() {
        let row = label(bar("AAA", (2024, 1, 2), [10.5, 11.0, 10.2, 10.8], 10.0));
        assert!(!row.label_limit_up);
        assert!(row.label_opened);
        assert!(!row.label_sealed);
    }

    #[test]
    fn st_instrument_uses_five_percent_band() {
        let row = label(bar("STX", (2024, 1, 2), [10.5, 10.5, 10.5, 10.5], 10.0));
        assert_eq!(row.limit_up_price, Some(10.5));
        assert!(row.label_one_word);
        assert!(row.is_special_treatment);
    }

    #[test]
    fn ipo_window_suppresses_labels() {
        let row = label(bar("NEW", (2024, 1, 3), [12.0, 12.0, 12.0, 12.0], 10.0));
        assert!(!row.price_limit_applicable);
        assert!(!row.label_limit_up);
        assert!(!row.label_opened);
        assert_eq!(row.limit_up_price, Some(12.0));
    }

    #[test]
    fn unknown_instrument_uses_main_rules() {
        let row = label(bar("ZZZ", (2024, 1, 2), [11.0, 11.0, 10.0, 11.0], 10.0));
        assert_eq!(row.board, Board::Unknown);
        assert!(row.price_limit_applicable);
        assert!(row.label_limit_up);
    }

    #[test]
    fn epsilon_absorbs_feed_noise() {
        let noisy = bar("AAA", (2024, 1, 2), [10.5, 10.9995, 10.2, 10.9995], 10.0);
        let strict = label_bar(noisy.clone(), &table(), &LimitRuleResolver::default(), DEFAULT_EPS);
        let loose = label_bar(noisy, &table(), &LimitRuleResolver::default(), 1e-3);
        assert!(!strict.label_limit_up);
        assert!(loose.label_limit_up);
    }

    #[test]
    fn nan_previous_close_yields_no_labels() {
        let row = label(bar("AAA", (2024, 1, 2), [11.0, 11.0, 11.0, 11.0], f64::NAN));
        assert_eq!(row.limit_up_price, None);
        assert!(!row.label_limit_up);
        assert!(!row.label_opened);
    }

    #[test]
    fn label_bars_preserves_order() {
        let rows = label_bars(
            vec![
                bar("AAA", (2024, 1, 3), [10.0, 10.0, 10.0, 10.0], 10.0),
                bar("AAA", (2024, 1, 2), [11.0, 11.0, 11.0, 11.0], 10.0),
            ],
            &table(),
            &LimitRuleResolver::default(),
            DEFAULT_EPS,
        );
        assert_eq!(rows[0].bar.trade_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(!rows[0].label_limit_up);
        assert!(rows[1].label_limit_up);
    }
}
