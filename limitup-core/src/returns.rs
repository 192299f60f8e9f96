//! Forward-return engine: next-session open and close returns per instrument.

use crate::domain::{AnnotatedBar, BarRow};
use crate::series::{chronological_groups, scatter};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Returns from holding a row's close into the instrument's next observed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturns {
    pub next_open_ret: Option<f64>,
    pub next_close_ret: Option<f64>,
}

fn forward_return(next_price: f64, close: f64) -> Option<f64> {
    if !close.is_finite() || close == 0.0 || !next_price.is_finite() {
        return None;
    }
    Some(next_price / close - 1.0)
}

/// Forward returns for every row, in input order.
///
/// Input order does not matter: each instrument is scanned in `(date, row index)`
/// order. The last observed row of an instrument, and any row with a zero or
/// missing close, gets `None`.
pub fn compute_forward_returns<T: BarRow + Sync>(rows: &[T]) -> Vec<ForwardReturns> {
    let groups = chronological_groups(rows);
    let pairs: Vec<(usize, ForwardReturns)> = groups
        .par_iter()
        .flat_map_iter(|indices| {
            indices
                .windows(2)
                .map(|pair| {
                    let current = rows[pair[0]].bar();
                    let next = rows[pair[1]].bar();
                    let returns = ForwardReturns {
                        next_open_ret: forward_return(next.open, current.close),
                        next_close_ret: forward_return(next.close, current.close),
                    };
                    (pair[0], returns)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    scatter(rows.len(), ForwardReturns::default(), pairs)
}

/// Fill `next_open_ret` and `next_close_ret` on every row in place.
pub fn apply_forward_returns(rows: &mut [AnnotatedBar]) {
    let returns = compute_forward_returns(rows);
    for (row, ret) in rows.iter_mut().zip(returns) {
        row.next_open_ret = ret.next_open_ret;
        row.next_close_ret = ret.next_close_ret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyBar;
    use chrono::NaiveDate;

    fn bar(id: &str, day: u32, open: f64, close: f64) -> DailyBar {
        DailyBar {
            instrument_id: id.into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            previous_close: close,
            volume: 1.0,
            turnover_amount: 1.0,
        }
    }

    fn approx(value: Option<f64>, expected: f64) -> bool {
        value.is_some_and(|v| (v - expected).abs() < 1e-12)
    }

    #[test]
    fn unsorted_input_matches_chronology() {
        let rows = vec![
            bar("AAA", 3, 11.0, 12.0),
            bar("AAA", 2, 10.0, 10.0),
            bar("BBB", 2, 20.0, 20.0),
            bar("BBB", 3, 19.0, 18.0),
        ];
        let out = compute_forward_returns(&rows);

        assert!(approx(out[1].next_open_ret, 0.10));
        assert!(approx(out[1].next_close_ret, 0.20));
        assert!(approx(out[2].next_open_ret, -0.05));
        assert!(approx(out[2].next_close_ret, -0.10));
        assert_eq!(out[0], ForwardReturns::default());
        assert_eq!(out[3], ForwardReturns::default());
    }

    #[test]
    fn zero_or_missing_close_is_undefined() {
        let rows = vec![
            bar("AAA", 2, 10.0, 0.0),
            bar("AAA", 3, 10.0, f64::NAN),
            bar("AAA", 4, 10.0, 10.0),
        ];
        let out = compute_forward_returns(&rows);
        assert_eq!(out[0].next_open_ret, None);
        assert_eq!(out[1].next_close_ret, None);
    }

    #[test]
    fn duplicate_dates_keep_input_order() {
        let rows = vec![bar("AAA", 2, 10.0, 10.0), bar("AAA", 2, 10.0, 11.0)];
        let out = compute_forward_returns(&rows);
        assert!(approx(out[0].next_close_ret, 0.10));
        assert_eq!(out[1], ForwardReturns::default());
    }
}
