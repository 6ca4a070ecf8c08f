//! Liquidation price and detection.
//!
//! A position is wiped out once the adverse move equals its margin. With
//! `size = margin * leverage`, that move is `entry / leverage`, so the
//! liquidation price sits `1/leverage` away from entry. There is no
//! maintenance buffer and no penalty: hitting the price closes the position
//! and the margin is gone.
//!
//! At 1x the long liquidation price is 0, which a positive price never
//! reaches, and the short liquidation price is twice the entry. Both are
//! expected.

use crate::position::Position;
use crate::types::{Leverage, Price, Side};
use rust_decimal::Decimal;

/// Price at which the position's loss equals its margin.
///
/// Returns a raw `Decimal` rather than a [`Price`] because the long 1x case
/// is exactly zero.
pub fn calculate_liquidation_price(entry_price: Price, leverage: Leverage, side: Side) -> Decimal {
    let fraction = leverage.margin_fraction();

    match side {
        Side::Long => entry_price.value() * (Decimal::ONE - fraction),
        Side::Short => entry_price.value() * (Decimal::ONE + fraction),
    }
}

pub fn liquidation_price_of(position: &Position) -> Decimal {
    calculate_liquidation_price(position.entry_price, position.leverage, position.side)
}

/// Inclusive: a price exactly on the liquidation price liquidates.
pub fn is_liquidated(position: &Position, price: Price) -> bool {
    let liq_price = liquidation_price_of(position);

    match position.side {
        Side::Long => price.value() <= liq_price,
        Side::Short => price.value() >= liq_price,
    }
}

/// Distance to liquidation as a percent of the current price. Negative once past it.
pub fn liquidation_buffer_percent(position: &Position, price: Price) -> Decimal {
    let liq_price = liquidation_price_of(position);
    let distance = match position.side {
        Side::Long => price.value() - liq_price,
        Side::Short => liq_price - price.value(),
    };
    distance / price.value() * Decimal::ONE_HUNDRED
}
