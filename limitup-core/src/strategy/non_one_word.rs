//! Buy any limit-up day that was not one-word, sell at the next session's open.

use super::{ExitPriceType, Strategy};
use crate::domain::AnnotatedBar;
use crate::fill::FillModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyNonOneWordLimitUpSellNextOpen;

impl BuyNonOneWordLimitUpSellNextOpen {
    pub const NAME: &'static str = "buy_non_one_word_limitup_sell_next_open";
}

impl Strategy for BuyNonOneWordLimitUpSellNextOpen {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn exit_price_type(&self) -> ExitPriceType {
        ExitPriceType::NextOpen
    }

    fn generate_entries(&self, bars: &[AnnotatedBar], fill_model: FillModel) -> Vec<bool> {
        bars.iter()
            .map(|row| row.label_limit_up && !row.label_one_word && fill_model.can_buy(row))
            .collect()
    }
}
