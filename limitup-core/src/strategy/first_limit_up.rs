//! Buy the first day of a fresh limit-up streak, sell at the next session's close.

use super::{ExitPriceType, Strategy};
use crate::domain::AnnotatedBar;
use crate::fill::FillModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyFirstLimitUpSellNextClose;

impl BuyFirstLimitUpSellNextClose {
    pub const NAME: &'static str = "buy_first_limitup_sell_next_close";
}

impl Strategy for BuyFirstLimitUpSellNextClose {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn exit_price_type(&self) -> ExitPriceType {
        ExitPriceType::NextClose
    }

    fn generate_entries(&self, bars: &[AnnotatedBar], fill_model: FillModel) -> Vec<bool> {
        bars.iter()
            .map(|row| row.label_limit_up && row.streak_up == 1 && fill_model.can_buy(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::labeled_row;
    use chrono::NaiveDate;

    #[test]
    fn only_streak_one_is_entered() {
        let bars = vec![
            labeled_row("AAA", 2, 10.8, 11.0, true, 1, false, false),
            labeled_row("AAA", 3, 11.5, 12.1, true, 2, false, false),
            labeled_row("AAA", 4, 12.0, 12.0, false, 0, false, false),
        ];
        let entries = BuyFirstLimitUpSellNextClose.generate_entries(&bars, FillModel::Ideal);
        assert_eq!(entries, vec![true, false, false]);

        let exits = BuyFirstLimitUpSellNextClose.generate_exits(&bars, FillModel::Ideal);
        assert_eq!(exits, vec![NaiveDate::from_ymd_opt(2024, 1, 3), None, None]);
    }

    #[test]
    fn sealed_first_day_blocked_when_conservative() {
        let bars = vec![labeled_row("AAA", 2, 11.0, 11.0, true, 1, true, true)];
        let strategy = BuyFirstLimitUpSellNextClose;
        assert_eq!(strategy.generate_entries(&bars, FillModel::Ideal), vec![true]);
        assert_eq!(
            strategy.generate_entries(&bars, FillModel::Conservative),
            vec![false]
        );
    }
}
