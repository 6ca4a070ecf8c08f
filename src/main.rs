//! Paper leveraged-trading simulation.
//!
//! Drives the ledger from a scripted price feed: liquidation, stop loss,
//! manual close racing a trigger, and a persisted restart followed by reset.

use paper_perps::*;
use rust_decimal_macros::dec;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = LedgerConfig::from_env()?;

    println!("Paper Perps Ledger Simulation");
    println!("Starting balance ${}, max leverage {}x\n", config.starting_balance, config.max_leverage);

    scenario_1_long_liquidation(&config)?;
    scenario_2_short_stop_loss(&config)?;
    scenario_3_manual_close_races_trigger(&config)?;
    scenario_4_persist_and_reset(&config)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

/// Poll the feed once and push the snapshot through the ledger.
fn tick(
    ledger: &mut Ledger,
    board: &mut MarketBoard,
    feed: &mut dyn PriceFeed,
    interval_ms: u64,
) -> Result<SettlementReport, PriceFeedError> {
    ledger.advance_time(interval_ms as i64);
    let snapshot = feed.poll()?;
    board.apply_snapshot(snapshot, ledger.time());
    Ok(ledger.refresh_and_settle(&board.prices()))
}

fn print_closes(report: &SettlementReport) {
    for close in &report.closed {
        let origin = if close.reason.is_automatic() { "auto" } else { "manual" };
        println!(
            "    {} closed by {:?} ({}) @ ${}, pnl ${} ({}%)",
            close.position_id,
            close.reason,
            origin,
            close.close_price,
            close.realized_pnl,
            close.realized_pnl_percentage.round_dp(2)
        );
    }
}

/// 10x long from $100 rides up to $110 then gets liquidated at $90.
fn scenario_1_long_liquidation(config: &LedgerConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 1: Long Liquidation\n");

    let mut ledger = Ledger::new(config.clone());
    let mut board = MarketBoard::new(config.min_price_update_interval_ms);
    let mut feed = ScriptedFeed::from_prices("bitcoin", "btc", "Bitcoin", &[dec!(110), dec!(90)]);

    let terms = OpenTerms::new(
        AssetId::new("bitcoin"),
        Side::Long,
        Price::new_unchecked(dec!(100)),
        Quote::new(dec!(100)),
        Leverage::clamped(10, config.max_leverage),
    );
    let preview = preview_open(&terms);
    println!("  Size ${}, liquidation @ ${}", preview.position_size, preview.liquidation_price);

    let id = ledger.open_position(terms)?;
    ledger.select_asset(Some(AssetId::new("bitcoin")));
    println!("  Opened {}, balance ${}", id, ledger.wallet().balance);

    tick(&mut ledger, &mut board, &mut feed, config.price_refresh_interval_ms)?;
    if let (Some(pos), Some(asset)) = (ledger.get_position(id), board.selected(ledger.selected_asset())) {
        let buffer = liquidation_buffer_percent(pos, asset.price()?);
        println!(
            "  {} @ ${}: pnl ${} ({}%), {}% from liquidation",
            asset.name,
            asset.current_price,
            pos.current_pnl,
            pos.current_pnl_percentage,
            buffer.round_dp(2)
        );
    }

    let report = tick(&mut ledger, &mut board, &mut feed, config.price_refresh_interval_ms)?;
    print_closes(&report);
    println!("  Balance ${}, realized ${}\n", ledger.wallet().balance, ledger.wallet().total_realized_pnl);

    Ok(())
}

/// 5x short from $50 with a stop at $55, price gaps to $56.
fn scenario_2_short_stop_loss(config: &LedgerConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 2: Short Stop Loss\n");

    let mut ledger = Ledger::new(config.clone());
    let mut board = MarketBoard::new(config.min_price_update_interval_ms);
    let mut feed = ScriptedFeed::from_prices("ethereum", "eth", "Ethereum", &[dec!(52), dec!(56)]);

    let id = ledger.open_position(
        OpenTerms::new(
            AssetId::new("ethereum"),
            Side::Short,
            Price::new_unchecked(dec!(50)),
            Quote::new(dec!(50)),
            Leverage::clamped(5, config.max_leverage),
        )
        .with_stop_loss(Price::new_unchecked(dec!(55))),
    )?;
    println!("  Opened {}, stop @ $55", id);

    for _ in 0..2 {
        let report = tick(&mut ledger, &mut board, &mut feed, config.price_refresh_interval_ms)?;
        print_closes(&report);
    }

    println!("  Balance ${}, realized ${}\n", ledger.wallet().balance, ledger.wallet().total_realized_pnl);
    Ok(())
}

/// Take profit fires on the tick, then the user's close arrives late and is ignored.
fn scenario_3_manual_close_races_trigger(config: &LedgerConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 3: Manual Close vs Trigger\n");

    let mut ledger = Ledger::new(config.clone());
    let mut board = MarketBoard::new(config.min_price_update_interval_ms);
    let mut feed = ScriptedFeed::from_prices("solana", "sol", "Solana", &[dec!(165)]);

    let id = ledger.open_position(
        OpenTerms::new(
            AssetId::new("solana"),
            Side::Long,
            Price::new_unchecked(dec!(150)),
            Quote::new(dec!(1000)),
            Leverage::clamped(3, config.max_leverage),
        )
        .with_take_profit(Price::new_unchecked(dec!(160))),
    )?;

    let report = tick(&mut ledger, &mut board, &mut feed, config.price_refresh_interval_ms)?;
    print_closes(&report);

    let late = ledger.close_position(id, Price::new_unchecked(dec!(165)));
    println!("  Late manual close applied: {}", late.is_some());
    println!("  Balance ${}, closed history {}\n", ledger.wallet().balance, ledger.closed_positions().len());

    Ok(())
}

/// Save, restore into a fresh ledger, then wipe everything.
fn scenario_4_persist_and_reset(config: &LedgerConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 4: Persist, Restore, Reset\n");

    let dir = std::env::var("PAPER_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    let mut store = JsonFileStore::new(dir, &config.storage_key);

    let mut ledger = Ledger::new(config.clone());
    ledger.select_asset(Some(AssetId::new("bitcoin")));
    for margin in [dec!(500), dec!(1500)] {
        ledger.open_position(OpenTerms::new(
            AssetId::new("bitcoin"),
            Side::Long,
            Price::new_unchecked(dec!(64000)),
            Quote::new(margin),
            Leverage::clamped(20, config.max_leverage),
        ))?;
    }
    ledger.save(&mut store)?;
    println!("  Saved to {}", store.path().display());

    let mut restored = Ledger::restore(config.clone(), &store)?;
    println!(
        "  Restored: {} active, balance ${}",
        restored.active_positions().len(),
        restored.wallet().balance
    );

    restored.reset_wallet();
    restored.save(&mut store)?;
    println!(
        "  After reset: balance ${}, realized ${}, {} active, {} closed",
        restored.wallet().balance,
        restored.wallet().total_realized_pnl,
        restored.active_positions().len(),
        restored.closed_positions().len()
    );

    Ok(())
}
