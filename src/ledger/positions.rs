//! Opening and closing positions.
//!
//! `settle_position` is the only code that returns margin to the wallet or
//! moves a position into the closed history. Manual closes and every
//! automatic trigger go through it.

use super::core::Ledger;
use super::results::{CloseResult, LedgerError};
use crate::events::{CloseReason, EventPayload, OpenRejectedEvent, PositionClosedEvent, PositionOpenedEvent};
use crate::position::{OpenTerms, Position};
use crate::types::{PositionId, Price};
use tracing::{debug, info, warn};

impl Ledger {
    /// Debit the margin and add the position to the active set.
    /// On error nothing has changed.
    pub fn open_position(&mut self, terms: OpenTerms) -> Result<PositionId, LedgerError> {
        if !terms.margin.is_positive() {
            let error = LedgerError::InvalidTerms(format!("margin must be positive, got {}", terms.margin));
            return Err(self.reject_open(&terms, error));
        }

        if let Err(e) = self.state.wallet.reserve_margin(terms.margin) {
            return Err(self.reject_open(&terms, e.into()));
        }

        let id = self.next_position_id();
        let position = Position::open(id, terms, self.current_time);
        let new_balance = self.state.wallet.balance;

        info!(
            position = %id,
            asset = %position.asset_id,
            side = %position.side,
            entry = %position.entry_price,
            margin = %position.margin,
            leverage = %position.leverage,
            "position opened"
        );

        let event = PositionOpenedEvent {
            position_id: id,
            asset_id: position.asset_id.clone(),
            side: position.side,
            entry_price: position.entry_price,
            margin: position.margin,
            leverage: position.leverage,
            position_size: position.position_size,
            new_balance,
        };

        self.state.active_positions.push(position);
        self.emit_event(EventPayload::PositionOpened(event));

        Ok(id)
    }

    // every rejected open is logged and audited the same way
    fn reject_open(&mut self, terms: &OpenTerms, error: LedgerError) -> LedgerError {
        warn!(asset = %terms.asset_id, margin = %terms.margin, error = %error, "open rejected");
        self.emit_event(EventPayload::OpenRejected(OpenRejectedEvent {
            asset_id: terms.asset_id.clone(),
            margin: terms.margin,
            reason: error.to_string(),
        }));
        error
    }

    /// User-initiated close at the given price. `None` if the id is not open,
    /// which includes a position a trigger already closed this tick.
    pub fn close_position(&mut self, id: PositionId, current_price: Price) -> Option<CloseResult> {
        self.settle_position(id, current_price, CloseReason::UserClosed)
    }

    pub(super) fn settle_position(
        &mut self,
        id: PositionId,
        close_price: Price,
        reason: CloseReason,
    ) -> Option<CloseResult> {
        let Some(index) = self.state.active_positions.iter().position(|p| p.id == id) else {
            debug!(position = %id, "close ignored, position not active");
            return None;
        };

        let position = self.state.active_positions.remove(index);
        let snapshot = position.pnl_at(close_price);
        let margin = position.margin;

        self.state.wallet.settle(margin, snapshot.pnl);

        let closed = position.into_closed(close_price, snapshot, reason, self.current_time);
        let result = CloseResult {
            position_id: id,
            asset_id: closed.asset_id.clone(),
            close_price,
            realized_pnl: snapshot.pnl,
            realized_pnl_percentage: snapshot.pnl_percentage,
            amount_credited: margin.add(snapshot.pnl),
            reason,
        };

        info!(
            position = %id,
            asset = %closed.asset_id,
            price = %close_price,
            pnl = %snapshot.pnl,
            reason = ?reason,
            "position closed"
        );

        if result.amount_credited.is_negative() {
            warn!(
                position = %id,
                debited = %result.amount_credited,
                "price gapped past liquidation, loss exceeds margin"
            );
        }

        self.state.closed_positions.insert(0, closed);

        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            position_id: id,
            asset_id: result.asset_id.clone(),
            exit_price: close_price,
            realized_pnl: snapshot.pnl,
            realized_pnl_percentage: snapshot.pnl_percentage,
            margin_returned: margin,
            close_reason: reason,
        }));

        Some(result)
    }
}
