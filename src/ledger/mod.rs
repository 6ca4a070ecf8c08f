// 8.0: the position ledger. wallet accounting, position lifecycle, and
// per-tick trigger evaluation folded into one state machine.
// synchronous and deterministic: every operation finishes before the next starts.

mod core;
mod positions;
mod pricing;
mod results;

pub use self::core::{Ledger, LedgerState};
pub use self::results::{CloseResult, LedgerError, SettlementReport};
