// 8.0.2: result types and errors for ledger operations.

use crate::events::CloseReason;
use crate::types::{AssetId, PositionId, Price, Quote};
use crate::wallet::WalletError;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct CloseResult {
    pub position_id: PositionId,
    pub asset_id: AssetId,
    pub close_price: Price,
    pub realized_pnl: Quote,
    pub realized_pnl_percentage: Decimal,
    // margin + pnl credited back to the wallet
    pub amount_credited: Quote,
    pub reason: CloseReason,
}

/// Outcome of one price tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementReport {
    pub closed: Vec<CloseResult>,
    pub refreshed: Vec<PositionId>,
    // no price for the asset this tick. live pnl left as it was
    pub stale: Vec<PositionId>,
}

impl SettlementReport {
    pub fn closed_by(&self, reason: CloseReason) -> impl Iterator<Item = &CloseResult> {
        self.closed.iter().filter(move |c| c.reason == reason)
    }

    pub fn realized_pnl(&self) -> Quote {
        self.closed.iter().map(|c| c.realized_pnl).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Quote, available: Quote },

    #[error("Invalid terms: {0}")]
    InvalidTerms(String),
}

impl From<WalletError> for LedgerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::InsufficientBalance { requested, available } => {
                LedgerError::InsufficientBalance { requested, available }
            }
        }
    }
}
