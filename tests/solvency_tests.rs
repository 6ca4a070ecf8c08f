//! Wallet conservation invariants.
//!
//! These tests drive the ledger through random open/close/tick sequences and
//! check that cash is neither created nor destroyed outside realized pnl.

use paper_perps::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Action {
    Open { long: bool, margin: i64, leverage: u32, tp_offset: Option<i64>, sl_offset: Option<i64> },
    Close { pick: usize, price: i64 },
    Tick { price: i64 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (
            any::<bool>(),
            1i64..3_000i64,
            1u32..=50u32,
            proptest::option::of(1i64..40i64),
            proptest::option::of(1i64..40i64),
        )
            .prop_map(|(long, margin, leverage, tp_offset, sl_offset)| Action::Open {
                long,
                margin,
                leverage,
                tp_offset,
                sl_offset,
            }),
        (0usize..10, 50i64..150i64).prop_map(|(pick, price)| Action::Close { pick, price }),
        (50i64..150i64).prop_map(|price| Action::Tick { price }),
    ]
}

const ENTRY: Decimal = dec!(100);

fn terms_for(long: bool, margin: i64, leverage: u32, tp_offset: Option<i64>, sl_offset: Option<i64>) -> OpenTerms {
    let side = Side::from_is_long(long);
    let mut terms = OpenTerms::new(
        AssetId::new("bitcoin"),
        side,
        Price::new_unchecked(ENTRY),
        Quote::new(Decimal::from(margin)),
        Leverage::new(leverage).unwrap(),
    );

    // tp on the winning side of entry, sl on the losing side
    let sign = side.sign();
    terms.take_profit = tp_offset.map(|o| Price::new_unchecked(ENTRY + sign * Decimal::from(o)));
    terms.stop_loss = sl_offset.map(|o| Price::new_unchecked(ENTRY - sign * Decimal::from(o)));
    terms
}

fn btc_price(price: i64) -> HashMap<AssetId, Price> {
    HashMap::from([(AssetId::new("bitcoin"), Price::new_unchecked(Decimal::from(price)))])
}

fn locked_margin(ledger: &Ledger) -> Quote {
    ledger.active_positions().iter().map(|p| p.margin).sum()
}

proptest! {
    /// balance + margin still locked = starting balance + realized pnl
    #[test]
    fn cash_conserved(actions in proptest::collection::vec(action_strategy(), 1..40)) {
        let config = LedgerConfig::default();
        let start = config.starting_balance;
        let mut ledger = Ledger::new(config);

        for action in actions {
            match action {
                Action::Open { long, margin, leverage, tp_offset, sl_offset } => {
                    let _ = ledger.open_position(terms_for(long, margin, leverage, tp_offset, sl_offset));
                }
                Action::Close { pick, price } => {
                    let ids: Vec<PositionId> = ledger.active_positions().iter().map(|p| p.id).collect();
                    if !ids.is_empty() {
                        let id = ids[pick % ids.len()];
                        ledger.close_position(id, Price::new_unchecked(Decimal::from(price)));
                    }
                }
                Action::Tick { price } => {
                    ledger.refresh_and_settle(&btc_price(price));
                }
            }

            let wallet = ledger.wallet();
            let lhs = wallet.balance.add(locked_margin(&ledger));
            let rhs = start.add(wallet.total_realized_pnl);
            let diff = (lhs.value() - rhs.value()).abs();
            prop_assert!(diff < dec!(0.000001), "cash leaked: {} vs {}", lhs, rhs);
        }
    }

    /// Every position id appears exactly once across active and closed
    #[test]
    fn positions_never_duplicated(actions in proptest::collection::vec(action_strategy(), 1..40)) {
        let mut ledger = Ledger::new(LedgerConfig::default());
        let mut opened = 0usize;

        for action in actions {
            match action {
                Action::Open { long, margin, leverage, tp_offset, sl_offset } => {
                    if ledger.open_position(terms_for(long, margin, leverage, tp_offset, sl_offset)).is_ok() {
                        opened += 1;
                    }
                }
                Action::Close { pick, price } => {
                    let ids: Vec<PositionId> = ledger.active_positions().iter().map(|p| p.id).collect();
                    if !ids.is_empty() {
                        ledger.close_position(ids[pick % ids.len()], Price::new_unchecked(Decimal::from(price)));
                    }
                }
                Action::Tick { price } => {
                    ledger.refresh_and_settle(&btc_price(price));
                }
            }
        }

        let mut ids: Vec<PositionId> = ledger
            .active_positions()
            .iter()
            .chain(ledger.closed_positions().iter())
            .map(|p| p.id)
            .collect();
        prop_assert_eq!(ids.len(), opened);
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), opened);

        prop_assert!(ledger.active_positions().iter().all(|p| !p.is_closed()));
        prop_assert!(ledger.closed_positions().iter().all(|p| p.is_closed()));
    }

    /// Opening debits exactly the margin, closing credits exactly margin + pnl
    #[test]
    fn open_close_wallet_deltas(
        long in any::<bool>(),
        margin in 1i64..5_000i64,
        leverage in 1u32..=100u32,
        exit in 1i64..300i64,
    ) {
        let mut ledger = Ledger::new(LedgerConfig::default());
        let before_open = ledger.wallet().balance;

        let id = ledger.open_position(terms_for(long, margin, leverage, None, None)).unwrap();
        let margin_q = Quote::new(Decimal::from(margin));
        prop_assert_eq!(ledger.wallet().balance, before_open.sub(margin_q));
        prop_assert_eq!(ledger.active_positions().iter().filter(|p| p.id == id).count(), 1);

        let before_close = ledger.wallet().clone();
        let result = ledger.close_position(id, Price::new_unchecked(Decimal::from(exit))).unwrap();

        prop_assert_eq!(ledger.wallet().balance, before_close.balance.add(margin_q).add(result.realized_pnl));
        prop_assert_eq!(
            ledger.wallet().total_realized_pnl,
            before_close.total_realized_pnl.add(result.realized_pnl)
        );
        prop_assert_eq!(ledger.closed_positions()[0].id, id);
        prop_assert!(!ledger.is_active(id));

        // second close is a no-op
        let after = ledger.wallet().clone();
        prop_assert!(ledger.close_position(id, Price::new_unchecked(Decimal::from(exit))).is_none());
        prop_assert_eq!(ledger.wallet(), &after);
    }
}
