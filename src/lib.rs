// paper-perps: leveraged paper-trading ledger.
// margin accounting, liquidation math, and trigger precedence live here.
// all computation is deterministic; I/O stays behind the feed and store traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AssetId, PositionId, Side, Price, Quote, Leverage
//   2.x  conditional.rs: take profit, stop loss, trigger order, open preview
//   4.x  position.rs: position record, sizing, pnl
//   5.x  wallet.rs: balance + realized pnl
//   6.x  liquidation.rs: liquidation price and detection
//   7.x  config.rs: starting balance, leverage bound, cadence, env overrides
//   8.x  ledger/: open, close, refresh_and_settle, reset
//   9.x  price_feed.rs: feed trait + scripted feed
//   9.1  persistence.rs: state store trait, json file + memory stores
//   11.x events.rs: state transition events for audit
//   12.x market.rs: latest asset snapshots, price map for ticks

// core ledger modules
pub mod conditional;
pub mod events;
pub mod ledger;
pub mod liquidation;
pub mod position;
pub mod types;
pub mod wallet;

// integration modules
pub mod config;
pub mod market;
pub mod persistence;
pub mod price_feed;

// re exports for convenience
pub use conditional::*;
pub use events::*;
pub use ledger::*;
pub use liquidation::*;
pub use position::*;
pub use types::*;
pub use wallet::*;
pub use config::{ConfigError, LedgerConfig, DEFAULT_STORAGE_KEY};
pub use market::MarketBoard;
pub use persistence::{JsonFileStore, MemoryStore, StateStore, StoreError};
pub use price_feed::{Asset, PriceFeed, PriceFeedError, ScriptedFeed};
