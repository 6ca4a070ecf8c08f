// 11.0: every ledger state change produces an event. used for the audit trail
// and for the presentation layer's notifications. EventPayload lists all event types.

use crate::types::{AssetId, Leverage, PositionId, Price, Quote, Side, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Position events
    PositionOpened(PositionOpenedEvent),
    OpenRejected(OpenRejectedEvent),
    PositionClosed(PositionClosedEvent),

    // Wallet events
    WalletReset(WalletResetEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub asset_id: AssetId,
    pub side: Side,
    pub entry_price: Price,
    pub margin: Quote,
    pub leverage: Leverage,
    pub position_size: Quote,
    pub new_balance: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRejectedEvent {
    pub asset_id: AssetId,
    pub margin: Quote,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub asset_id: AssetId,
    pub exit_price: Price,
    pub realized_pnl: Quote,
    pub realized_pnl_percentage: Decimal,
    pub margin_returned: Quote,
    pub close_reason: CloseReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseReason {
    UserClosed,
    TakeProfit,
    StopLoss,
    Liquidation,
}

impl CloseReason {
    pub fn is_automatic(&self) -> bool {
        !matches!(self, CloseReason::UserClosed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResetEvent {
    pub starting_balance: Quote,
    pub positions_discarded: usize,
    pub history_discarded: usize,
}
