//! Streak tracker: consecutive limit-up days per instrument, gap-aware.
//!
//! Continuity is judged against a [`MarketCalendar`] built from the distinct trade
//! dates present in the input itself. A bar continues its instrument's streak only
//! if the instrument's previous observed bar sits on the immediately preceding
//! calendar position. Consequence: results depend on which dates the batch
//! contains. A day on which no instrument traded is invisible, and a day on which
//! only unrelated instruments traded still breaks a streak.

use crate::domain::{AnnotatedBar, BarRow};
use crate::series::{chronological_groups, scatter};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Sorted, de-duplicated trade dates observed in a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketCalendar {
    dates: Vec<NaiveDate>,
}

impl MarketCalendar {
    pub fn from_rows<T: BarRow>(rows: &[T]) -> Self {
        let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.bar().trade_date).collect();
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Position of `date` in the calendar.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Carried state while scanning one instrument in date order.
#[derive(Debug, Clone, Copy, Default)]
struct StreakState {
    previous_streak: u32,
    previous_was_limit_up: bool,
    previous_position: Option<usize>,
}

impl StreakState {
    fn advance(&mut self, is_limit_up: bool, position: usize) -> u32 {
        let continuous = self
            .previous_position
            .is_some_and(|prev| position == prev + 1);
        let streak = match (is_limit_up, self.previous_was_limit_up && continuous) {
            (false, _) => 0,
            (true, true) => self.previous_streak + 1,
            (true, false) => 1,
        };
        self.previous_streak = streak;
        self.previous_was_limit_up = is_limit_up;
        self.previous_position = Some(position);
        streak
    }
}

/// Streak value for every row, in input order.
pub fn compute_streaks(rows: &[AnnotatedBar]) -> Vec<u32> {
    let calendar = MarketCalendar::from_rows(rows);
    let groups = chronological_groups(rows);

    let pairs: Vec<(usize, u32)> = groups
        .par_iter()
        .flat_map_iter(|indices| {
            let mut state = StreakState::default();
            indices
                .iter()
                .map(|&idx| {
                    let row = &rows[idx];
                    // every row's date is in the calendar by construction
                    let position = calendar.position(row.bar.trade_date).unwrap_or_default();
                    (idx, state.advance(row.label_limit_up, position))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(
        rows = rows.len(),
        instruments = groups.len(),
        calendar_days = calendar.len(),
        "computed streaks"
    );
    scatter(rows.len(), 0, pairs)
}

/// Fill `streak_up` on every row in place.
pub fn apply_streaks(rows: &mut [AnnotatedBar]) {
    let streaks = compute_streaks(rows);
    for (row, streak) in rows.iter_mut().zip(streaks) {
        row.streak_up = streak;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, DailyBar};

    fn row(id: &str, date: (i32, u32, u32), limit_up: bool) -> AnnotatedBar {
        let bar = DailyBar {
            instrument_id: id.into(),
            trade_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            open: 10.0,
            high: 11.0,
            low: 10.0,
            close: 11.0,
            previous_close: 10.0,
            volume: 100.0,
            turnover_amount: 1_000.0,
        };
        let mut r = AnnotatedBar::unlabeled(bar, Board::Main, false);
        r.price_limit_applicable = true;
        r.label_limit_up = limit_up;
        r
    }

    #[test]
    fn streaks_reset_on_non_limit_days() {
        let days = [(2024, 1, 2), (2024, 1, 3), (2024, 1, 4), (2024, 1, 5), (2024, 1, 8), (2024, 1, 9)];
        let aaa = [true, true, false, true, true, true];
        let bbb = [false, true, true, true, false, true];
        let mut rows = Vec::new();
        for (i, day) in days.iter().enumerate() {
            rows.push(row("AAA", *day, aaa[i]));
            rows.push(row("BBB", *day, bbb[i]));
        }

        let streaks = compute_streaks(&rows);
        let aaa_streaks: Vec<u32> = streaks.iter().step_by(2).copied().collect();
        let bbb_streaks: Vec<u32> = streaks.iter().skip(1).step_by(2).copied().collect();
        assert_eq!(aaa_streaks, vec![1, 2, 0, 1, 2, 3]);
        assert_eq!(bbb_streaks, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn missing_calendar_day_breaks_streak() {
        let rows = vec![
            row("AAA", (2024, 1, 2), true),
            row("BBB", (2024, 1, 3), false),
            row("AAA", (2024, 1, 4), true),
        ];
        assert_eq!(compute_streaks(&rows), vec![1, 0, 1]);
    }

    #[test]
    fn weekend_is_not_a_gap_when_nobody_traded() {
        // Friday then Monday: adjacent in the observed calendar
        let rows = vec![row("AAA", (2024, 1, 5), true), row("AAA", (2024, 1, 8), true)];
        assert_eq!(compute_streaks(&rows), vec![1, 2]);
    }

    #[test]
    fn output_follows_input_order() {
        let rows = vec![
            row("AAA", (2024, 1, 4), true),
            row("AAA", (2024, 1, 2), true),
            row("AAA", (2024, 1, 3), true),
        ];
        assert_eq!(compute_streaks(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn apply_streaks_sets_field() {
        let mut rows = vec![row("AAA", (2024, 1, 2), true), row("AAA", (2024, 1, 3), true)];
        apply_streaks(&mut rows);
        assert_eq!(rows[1].streak_up, 2);
    }

    #[test]
    fn calendar_positions() {
        let rows = vec![row("AAA", (2024, 1, 3), false), row("BBB", (2024, 1, 2), false)];
        let cal = MarketCalendar::from_rows(&rows);
        assert_eq!(cal.len(), 2);
        assert_eq!(cal.position(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()), Some(1));
        assert_eq!(cal.position(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()), None);
    }
}
