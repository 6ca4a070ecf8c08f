//! Price tick handling.
//!
//! Two passes: decide what happens to every active position against a
//! read-only view, then apply. Closing removes from the active set, so
//! nothing is mutated while the decisions are being made.

use super::core::Ledger;
use super::results::SettlementReport;
use crate::conditional::evaluate_triggers;
use crate::events::CloseReason;
use crate::position::PnlSnapshot;
use crate::types::{AssetId, PositionId, Price};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum TickDecision {
    Stale(PositionId),
    Refresh(PositionId, PnlSnapshot),
    Close(PositionId, Price, CloseReason),
}

impl Ledger {
    /// Sole entry point for feed prices. Positions whose asset has no price
    /// this tick are left as they were.
    pub fn refresh_and_settle(&mut self, latest_prices: &HashMap<AssetId, Price>) -> SettlementReport {
        let decisions: Vec<TickDecision> = self
            .state
            .active_positions
            .iter()
            .map(|position| {
                let Some(&price) = latest_prices.get(&position.asset_id) else {
                    return TickDecision::Stale(position.id);
                };

                match evaluate_triggers(position, price) {
                    Some(reason) => TickDecision::Close(position.id, price, reason),
                    None => TickDecision::Refresh(position.id, position.pnl_at(price)),
                }
            })
            .collect();

        let mut report = SettlementReport::default();

        for decision in decisions {
            match decision {
                TickDecision::Stale(id) => report.stale.push(id),
                TickDecision::Refresh(id, snapshot) => {
                    if let Some(position) = self.state.active_positions.iter_mut().find(|p| p.id == id) {
                        position.apply_pnl(snapshot);
                        report.refreshed.push(id);
                    }
                }
                TickDecision::Close(id, price, reason) => {
                    if let Some(result) = self.settle_position(id, price, reason) {
                        report.closed.push(result);
                    }
                }
            }
        }

        debug!(
            refreshed = report.refreshed.len(),
            closed = report.closed.len(),
            stale = report.stale.len(),
            "tick settled"
        );

        report
    }
}
