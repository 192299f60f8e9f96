//! AnnotatedBar: a daily bar enriched with limit-up labels, streak and forward returns.

use super::bar::{BarRow, DailyBar};
use super::instrument::Board;
use serde::{Deserialize, Serialize};

/// A `DailyBar` plus everything the labeling pipeline derives for it.
///
/// Forward returns are `None` when undefined (last session of an instrument, or a
/// zero/missing close). `streak_up` is zero until the streak stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub bar: DailyBar,

    // ── Instrument attributes ──
    pub board: Board,
    pub is_special_treatment: bool,

    // ── Limit state ──
    pub limit_up_price: Option<f64>,
    pub price_limit_applicable: bool,

    // ── Labels ──
    pub label_limit_up: bool,
    pub label_one_word: bool,
    pub label_opened: bool,
    pub label_sealed: bool,

    // ── Sequencing ──
    pub streak_up: u32,

    // ── Forward returns ──
    pub next_open_ret: Option<f64>,
    pub next_close_ret: Option<f64>,
}

impl AnnotatedBar {
    /// Wrap a bar with every label cleared.
    pub fn unlabeled(bar: DailyBar, board: Board, is_special_treatment: bool) -> Self {
        Self {
            bar,
            board,
            is_special_treatment,
            limit_up_price: None,
            price_limit_applicable: false,
            label_limit_up: false,
            label_one_word: false,
            label_opened: false,
            label_sealed: false,
            streak_up: 0,
            next_open_ret: None,
            next_close_ret: None,
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.bar.instrument_id
    }
}

impl BarRow for AnnotatedBar {
    fn bar(&self) -> &DailyBar {
        &self.bar
    }

    fn price_limit_applicable(&self) -> Option<bool> {
        Some(self.price_limit_applicable)
    }
}
