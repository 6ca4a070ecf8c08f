//! Take-profit, stop-loss, and the per-tick trigger decision.
//!
//! Triggers are attached to the position itself rather than stored as
//! separate orders. Each tick the ledger asks [`evaluate_triggers`] for at most
//! one reason to close.

use crate::events::CloseReason;
use crate::liquidation::{calculate_liquidation_price, is_liquidated};
use crate::position::{calculate_position_size, OpenTerms, Position};
use crate::types::{Price, Quote, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the trigger price should be compared. Both directions are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    Above,
    Below,
}

impl TriggerCondition {
    pub fn take_profit_for(side: Side) -> Self {
        match side {
            Side::Long => TriggerCondition::Above,
            Side::Short => TriggerCondition::Below,
        }
    }

    pub fn stop_loss_for(side: Side) -> Self {
        match side {
            Side::Long => TriggerCondition::Below,
            Side::Short => TriggerCondition::Above,
        }
    }

    pub fn is_met(&self, price: Price, trigger: Price) -> bool {
        match self {
            TriggerCondition::Above => price.value() >= trigger.value(),
            TriggerCondition::Below => price.value() <= trigger.value(),
        }
    }
}

pub fn should_take_profit(position: &Position, price: Price) -> bool {
    let Some(trigger) = position.take_profit else {
        return false;
    };
    TriggerCondition::take_profit_for(position.side).is_met(price, trigger)
}

pub fn should_stop_loss(position: &Position, price: Price) -> bool {
    let Some(trigger) = position.stop_loss else {
        return false;
    };
    TriggerCondition::stop_loss_for(position.side).is_met(price, trigger)
}

/// First condition that holds, checked as liquidation, take-profit, stop-loss.
pub fn evaluate_triggers(position: &Position, price: Price) -> Option<CloseReason> {
    if is_liquidated(position, price) {
        Some(CloseReason::Liquidation)
    } else if should_take_profit(position, price) {
        Some(CloseReason::TakeProfit)
    } else if should_stop_loss(position, price) {
        Some(CloseReason::StopLoss)
    } else {
        None
    }
}

/// What the trading form shows before a position is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPreview {
    pub position_size: Quote,
    pub liquidation_price: Decimal,
}

pub fn preview_open(terms: &OpenTerms) -> OpenPreview {
    OpenPreview {
        position_size: calculate_position_size(terms.margin, terms.leverage),
        liquidation_price: calculate_liquidation_price(terms.entry_price, terms.leverage, terms.side),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetId, Leverage, PositionId, Timestamp};
    use rust_decimal_macros::dec;

    fn position(side: Side, tp: Option<Decimal>, sl: Option<Decimal>) -> Position {
        let mut terms = OpenTerms::new(
            AssetId::new("ethereum"),
            side,
            Price::new_unchecked(dec!(100)),
            Quote::new(dec!(100)),
            Leverage::new(10).unwrap(),
        );
        terms.take_profit = tp.map(Price::new_unchecked);
        terms.stop_loss = sl.map(Price::new_unchecked);
        Position::open(PositionId(1), terms, Timestamp::from_millis(0))
    }

    fn px(v: Decimal) -> Price {
        Price::new_unchecked(v)
    }

    #[test]
    fn take_profit_for_long() {
        let pos = position(Side::Long, Some(dec!(105)), None);

        assert!(!should_take_profit(&pos, px(dec!(104))));
        assert!(should_take_profit(&pos, px(dec!(105))));
        assert!(should_take_profit(&pos, px(dec!(110))));
    }

    #[test]
    fn take_profit_for_short() {
        let pos = position(Side::Short, Some(dec!(95)), None);

        assert!(!should_take_profit(&pos, px(dec!(96))));
        assert!(should_take_profit(&pos, px(dec!(95))));
    }

    #[test]
    fn stop_loss_for_long() {
        let pos = position(Side::Long, None, Some(dec!(97)));

        assert!(!should_stop_loss(&pos, px(dec!(98))));
        assert!(should_stop_loss(&pos, px(dec!(97))));
        assert!(should_stop_loss(&pos, px(dec!(93))));
    }

    #[test]
    fn stop_loss_for_short() {
        let pos = position(Side::Short, None, Some(dec!(103)));

        assert!(!should_stop_loss(&pos, px(dec!(102))));
        assert!(should_stop_loss(&pos, px(dec!(103))));
    }

    #[test]
    fn unset_triggers_never_fire() {
        let pos = position(Side::Long, None, None);

        assert!(!should_take_profit(&pos, px(dec!(1000))));
        assert!(!should_stop_loss(&pos, px(dec!(91))));
        assert_eq!(evaluate_triggers(&pos, px(dec!(95))), None);
    }

    #[test]
    fn liquidation_checked_before_stop_loss() {
        // stop below the liquidation price: both hold at 85, liquidation wins
        let pos = position(Side::Long, None, Some(dec!(88)));
        assert_eq!(evaluate_triggers(&pos, px(dec!(85))), Some(CloseReason::Liquidation));
    }

    #[test]
    fn take_profit_checked_before_stop_loss() {
        // nonsensical terms where both hold at once
        let pos = position(Side::Long, Some(dec!(95)), Some(dec!(98)));
        assert_eq!(evaluate_triggers(&pos, px(dec!(96))), Some(CloseReason::TakeProfit));
    }

    #[test]
    fn stop_loss_alone() {
        let pos = position(Side::Short, Some(dec!(90)), Some(dec!(104)));
        assert_eq!(evaluate_triggers(&pos, px(dec!(105))), Some(CloseReason::StopLoss));
    }

    #[test]
    fn preview_matches_form() {
        let terms = OpenTerms::new(
            AssetId::new("bitcoin"),
            Side::Short,
            Price::new_unchecked(dec!(50)),
            Quote::new(dec!(50)),
            Leverage::new(5).unwrap(),
        );

        let preview = preview_open(&terms);
        assert_eq!(preview.position_size.value(), dec!(250));
        assert_eq!(preview.liquidation_price, dec!(60));
    }
}
