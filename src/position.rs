// 4.0: paper position tracking. pnl = (mark - entry) * size / entry, signed by side.
// 4.1 has the pure sizing/pnl math at the bottom.

use crate::events::CloseReason;
use crate::types::{AssetId, Leverage, PositionId, Price, Quote, Side, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// What a caller asks for when opening a position. Everything else is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTerms {
    pub asset_id: AssetId,
    pub entry_price: Price,
    pub margin: Quote,
    pub leverage: Leverage,
    pub side: Side,
    pub take_profit: Option<Price>,
    pub stop_loss: Option<Price>,
}

impl OpenTerms {
    pub fn new(asset_id: AssetId, side: Side, entry_price: Price, margin: Quote, leverage: Leverage) -> Self {
        Self {
            asset_id,
            entry_price,
            margin,
            leverage,
            side,
            take_profit: None,
            stop_loss: None,
        }
    }

    pub fn with_take_profit(mut self, price: Price) -> Self {
        self.take_profit = Some(price);
        self
    }

    pub fn with_stop_loss(mut self, price: Price) -> Self {
        self.stop_loss = Some(price);
        self
    }
}

/// One record for the whole lifecycle. Close fields stay `None` while open
/// and are written exactly once by [`Position::into_closed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub asset_id: AssetId,
    pub side: Side,
    pub entry_price: Price,
    pub margin: Quote,
    pub leverage: Leverage,
    pub position_size: Quote,
    pub take_profit: Option<Price>,
    pub stop_loss: Option<Price>,
    pub opened_at: Timestamp,

    // live, refreshed every tick while open
    pub current_pnl: Quote,
    pub current_pnl_percentage: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<Quote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_pnl_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<CloseReason>,
}

impl Position {
    pub fn open(id: PositionId, terms: OpenTerms, timestamp: Timestamp) -> Self {
        let position_size = calculate_position_size(terms.margin, terms.leverage);
        Self {
            id,
            asset_id: terms.asset_id,
            side: terms.side,
            entry_price: terms.entry_price,
            margin: terms.margin,
            leverage: terms.leverage,
            position_size,
            take_profit: terms.take_profit,
            stop_loss: terms.stop_loss,
            opened_at: timestamp,
            current_pnl: Quote::zero(),
            current_pnl_percentage: Decimal::ZERO,
            closed_at: None,
            close_price: None,
            realized_pnl: None,
            realized_pnl_percentage: None,
            close_reason: None,
        }
    }

    pub fn is_long(&self) -> bool {
        self.side.is_long()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    // 4.1: paper gains/losses at a given price
    pub fn pnl_at(&self, price: Price) -> PnlSnapshot {
        calculate_pnl(self.side, self.entry_price, self.position_size, self.margin, price)
    }

    pub fn apply_pnl(&mut self, snapshot: PnlSnapshot) {
        debug_assert!(!self.is_closed(), "closed positions are never refreshed");
        self.current_pnl = snapshot.pnl;
        self.current_pnl_percentage = snapshot.pnl_percentage;
    }

    // 4.2: stamp close fields. consumes the open record so it can't be refreshed again.
    pub fn into_closed(
        mut self,
        close_price: Price,
        snapshot: PnlSnapshot,
        reason: CloseReason,
        timestamp: Timestamp,
    ) -> Self {
        debug_assert!(!self.is_closed(), "position closed twice");
        self.closed_at = Some(timestamp);
        self.close_price = Some(close_price);
        self.realized_pnl = Some(snapshot.pnl);
        self.realized_pnl_percentage = Some(snapshot.pnl_percentage);
        self.close_reason = Some(reason);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlSnapshot {
    pub pnl: Quote,
    /// Return on margin, in percent.
    pub pnl_percentage: Decimal,
}

// 4.3: notional = margin * leverage
pub fn calculate_position_size(margin: Quote, leverage: Leverage) -> Quote {
    margin.mul(leverage.value())
}

// 4.4: pnl normalized by entry price. equivalent to holding size / entry units.
pub fn calculate_pnl(
    side: Side,
    entry_price: Price,
    position_size: Quote,
    margin: Quote,
    current_price: Price,
) -> PnlSnapshot {
    let move_in_favor = side.sign() * (current_price.value() - entry_price.value());
    let pnl = move_in_favor * position_size.value() / entry_price.value();

    let pnl_percentage = if margin.value().is_zero() {
        Decimal::ZERO
    } else {
        pnl / margin.value() * dec!(100)
    };

    PnlSnapshot {
        pnl: Quote::new(pnl),
        pnl_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn long_terms() -> OpenTerms {
        OpenTerms::new(
            AssetId::new("bitcoin"),
            Side::Long,
            Price::new_unchecked(dec!(100)),
            Quote::new(dec!(100)),
            Leverage::new(10).unwrap(),
        )
    }

    #[test]
    fn position_size_is_margin_times_leverage() {
        let size = calculate_position_size(Quote::new(dec!(250)), Leverage::new(4).unwrap());
        assert_eq!(size.value(), dec!(1000));
    }

    #[test]
    fn open_derives_size_and_zero_pnl() {
        let pos = Position::open(PositionId(1), long_terms(), Timestamp::from_millis(5));

        assert_eq!(pos.position_size.value(), dec!(1000));
        assert_eq!(pos.current_pnl, Quote::zero());
        assert_eq!(pos.opened_at, Timestamp::from_millis(5));
        assert!(!pos.is_closed());
        assert!(pos.is_long());
    }

    #[test]
    fn long_pnl_profit() {
        let pos = Position::open(PositionId(1), long_terms(), Timestamp::from_millis(0));

        // (110 - 100) * 1000 / 100 = 100, i.e. 100% on 100 margin
        let snap = pos.pnl_at(Price::new_unchecked(dec!(110)));
        assert_eq!(snap.pnl.value(), dec!(100));
        assert_eq!(snap.pnl_percentage, dec!(100));
    }

    #[test]
    fn long_pnl_loss() {
        let pos = Position::open(PositionId(1), long_terms(), Timestamp::from_millis(0));

        let snap = pos.pnl_at(Price::new_unchecked(dec!(95)));
        assert_eq!(snap.pnl.value(), dec!(-50));
        assert_eq!(snap.pnl_percentage, dec!(-50));
    }

    #[test]
    fn short_pnl_profits_when_price_drops() {
        let snap = calculate_pnl(
            Side::Short,
            Price::new_unchecked(dec!(50)),
            Quote::new(dec!(250)),
            Quote::new(dec!(50)),
            Price::new_unchecked(dec!(45)),
        );
        // (50 - 45) * 250 / 50 = 25
        assert_eq!(snap.pnl.value(), dec!(25));
        assert_eq!(snap.pnl_percentage, dec!(50));
    }

    #[test]
    fn short_pnl_at_stop() {
        let snap = calculate_pnl(
            Side::Short,
            Price::new_unchecked(dec!(50)),
            Quote::new(dec!(250)),
            Quote::new(dec!(50)),
            Price::new_unchecked(dec!(56)),
        );
        assert_eq!(snap.pnl.value(), dec!(-30));
        assert_eq!(snap.pnl_percentage, dec!(-60));
    }

    #[test]
    fn into_closed_stamps_close_fields() {
        let pos = Position::open(PositionId(7), long_terms(), Timestamp::from_millis(0));
        let price = Price::new_unchecked(dec!(120));
        let snap = pos.pnl_at(price);

        let closed = pos.into_closed(price, snap, CloseReason::TakeProfit, Timestamp::from_millis(10));

        assert!(closed.is_closed());
        assert_eq!(closed.close_price, Some(price));
        assert_eq!(closed.realized_pnl.unwrap().value(), dec!(200));
        assert_eq!(closed.realized_pnl_percentage, Some(dec!(200)));
        assert_eq!(closed.close_reason, Some(CloseReason::TakeProfit));
        assert_eq!(closed.closed_at, Some(Timestamp::from_millis(10)));
    }

    #[test]
    fn open_position_serializes_without_close_fields() {
        let pos = Position::open(PositionId(1), long_terms(), Timestamp::from_millis(0));
        let json = serde_json::to_value(&pos).unwrap();

        assert!(json.get("closed_at").is_none());
        assert!(json.get("realized_pnl").is_none());

        let back: Position = serde_json::from_value(json).unwrap();
        assert_eq!(back, pos);
    }
}
