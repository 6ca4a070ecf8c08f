//! Simulated cash balance.
//!
//! Opening a position moves its margin out of `balance`; closing it moves
//! `margin + pnl` back. Realized PnL is tracked separately and only ever
//! changes at close.

use crate::types::Quote;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: Quote,
    pub total_realized_pnl: Quote,
}

impl Wallet {
    pub fn new(starting_balance: Quote) -> Self {
        Self {
            balance: starting_balance,
            total_realized_pnl: Quote::zero(),
        }
    }

    pub fn can_afford(&self, margin: Quote) -> bool {
        margin.value() <= self.balance.value()
    }

    pub fn reserve_margin(&mut self, margin: Quote) -> Result<(), WalletError> {
        if !self.can_afford(margin) {
            return Err(WalletError::InsufficientBalance {
                requested: margin,
                available: self.balance,
            });
        }
        self.balance = self.balance.sub(margin);
        Ok(())
    }

    // margin comes back together with the (possibly negative) pnl
    pub fn settle(&mut self, margin: Quote, pnl: Quote) {
        self.balance = self.balance.add(margin).add(pnl);
        self.total_realized_pnl = self.total_realized_pnl.add(pnl);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Quote, available: Quote },
}
