// 8.0 ledger/core.rs: main ledger. holds the wallet, both position collections, the event log.

use crate::config::LedgerConfig;
use crate::events::{Event, EventId, EventPayload, WalletResetEvent};
use crate::persistence::{StateStore, StoreError};
use crate::position::Position;
use crate::types::{AssetId, PositionId, Quote, Timestamp};
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything that survives a restart. Serialized as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub wallet: Wallet,
    pub active_positions: Vec<Position>,
    // newest first
    pub closed_positions: Vec<Position>,
    #[serde(default)]
    pub selected_asset: Option<AssetId>,
    #[serde(default)]
    pub next_position_id: u64,
}

impl LedgerState {
    pub fn fresh(starting_balance: Quote) -> Self {
        Self {
            wallet: Wallet::new(starting_balance),
            active_positions: Vec::new(),
            closed_positions: Vec::new(),
            selected_asset: None,
            next_position_id: 1,
        }
    }

    fn latest_timestamp(&self) -> Option<Timestamp> {
        self.active_positions
            .iter()
            .chain(self.closed_positions.iter())
            .flat_map(|p| [Some(p.opened_at), p.closed_at])
            .flatten()
            .max()
    }

    // counter can lag behind the records if the blob was written by hand
    fn normalize_id_counter(&mut self) {
        let max_seen = self
            .active_positions
            .iter()
            .chain(self.closed_positions.iter())
            .map(|p| p.id.0)
            .max()
            .unwrap_or(0);
        self.next_position_id = self.next_position_id.max(max_seen.saturating_add(1)).max(1);
    }
}

/** 8.1: main ledger struct. all state lives here, mutated only through its operations */
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(super) config: LedgerConfig,
    pub(super) state: LedgerState,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        let state = LedgerState::fresh(config.starting_balance);
        Self::from_state(config, state)
    }

    /// The clock starts at wall time, or at the latest stored timestamp if
    /// the history is ahead of it.
    pub fn from_state(config: LedgerConfig, mut state: LedgerState) -> Self {
        state.normalize_id_counter();
        let current_time = state.latest_timestamp().map_or_else(Timestamp::now, |t| t.max(Timestamp::now()));
        Self {
            config,
            state,
            events: Vec::new(),
            next_event_id: 1,
            current_time,
        }
    }

    /// Load from the store, or start fresh if nothing usable is stored.
    pub fn restore<S: StateStore + ?Sized>(config: LedgerConfig, store: &S) -> Result<Self, StoreError> {
        match store.load()? {
            Some(state) => {
                info!(
                    active = state.active_positions.len(),
                    closed = state.closed_positions.len(),
                    "restored ledger state"
                );
                Ok(Self::from_state(config, state))
            }
            None => {
                info!(balance = %config.starting_balance, "no stored ledger state, starting fresh");
                Ok(Self::new(config))
            }
        }
    }

    pub fn save<S: StateStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.save(&self.state)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn wallet(&self) -> &Wallet {
        &self.state.wallet
    }

    pub fn active_positions(&self) -> &[Position] {
        &self.state.active_positions
    }

    pub fn closed_positions(&self) -> &[Position] {
        &self.state.closed_positions
    }

    /// Looks in the active set first, then the closed history.
    pub fn get_position(&self, id: PositionId) -> Option<&Position> {
        self.state
            .active_positions
            .iter()
            .chain(self.state.closed_positions.iter())
            .find(|p| p.id == id)
    }

    pub fn is_active(&self, id: PositionId) -> bool {
        self.state.active_positions.iter().any(|p| p.id == id)
    }

    pub fn selected_asset(&self) -> Option<&AssetId> {
        self.state.selected_asset.as_ref()
    }

    pub fn select_asset(&mut self, asset_id: Option<AssetId>) {
        self.state.selected_asset = asset_id;
    }

    /// Sum of live pnl over open positions, as of the last tick.
    pub fn unrealized_pnl(&self) -> Quote {
        self.state.active_positions.iter().map(|p| p.current_pnl).sum()
    }

    /// Irreversible. Callers confirm with the user first.
    pub fn reset_wallet(&mut self) {
        let positions_discarded = self.state.active_positions.len();
        let history_discarded = self.state.closed_positions.len();
        let starting_balance = self.config.starting_balance;

        self.state.wallet = Wallet::new(starting_balance);
        self.state.active_positions.clear();
        self.state.closed_positions.clear();

        info!(
            balance = %starting_balance,
            positions_discarded,
            history_discarded,
            "wallet reset"
        );

        self.emit_event(EventPayload::WalletReset(WalletResetEvent {
            starting_balance,
            positions_discarded,
            history_discarded,
        }));
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn next_position_id(&mut self) -> PositionId {
        let id = PositionId(self.state.next_position_id);
        self.state.next_position_id = self.state.next_position_id.saturating_add(1);
        id
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
