//! Latest asset snapshots as delivered by the price feed.
//!
//! The ledger does not own asset data. The board keeps the last snapshot
//! for display and turns it into the `{asset id -> price}` map that
//! [`crate::Ledger::refresh_and_settle`] consumes.

use crate::price_feed::Asset;
use crate::types::{AssetId, Price, Timestamp};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MarketBoard {
    assets: Vec<Asset>,
    last_price_update: Option<Timestamp>,
    min_update_interval_ms: u64,
}

impl MarketBoard {
    pub fn new(min_update_interval_ms: u64) -> Self {
        Self {
            assets: Vec::new(),
            last_price_update: None,
            min_update_interval_ms,
        }
    }

    /// Replace the board with a fresh feed snapshot. Never throttled.
    pub fn apply_snapshot(&mut self, assets: Vec<Asset>, now: Timestamp) {
        self.assets = assets;
        self.last_price_update = Some(now);
    }

    /// Patch one asset's price. Dropped (returns `false`) when the previous
    /// accepted update is too recent or the asset is unknown.
    pub fn update_asset_price(&mut self, asset_id: &AssetId, price: Price, now: Timestamp) -> bool {
        if let Some(last) = self.last_price_update {
            let elapsed = now.millis_since(&last);
            if elapsed < self.min_update_interval_ms as i64 {
                debug!(asset = %asset_id, elapsed_ms = elapsed, "price patch throttled");
                return false;
            }
        }

        let Some(asset) = self.assets.iter_mut().find(|a| &a.id == asset_id) else {
            return false;
        };

        asset.current_price = price.value();
        self.last_price_update = Some(now);
        true
    }

    pub fn get(&self, asset_id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == asset_id)
    }

    /// Metadata for the ledger's selected asset, patched prices included.
    pub fn selected(&self, selected: Option<&AssetId>) -> Option<&Asset> {
        selected.and_then(|id| self.get(id))
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn last_price_update(&self) -> Option<Timestamp> {
        self.last_price_update
    }

    // assets with a non-positive price are left out so their positions go stale
    pub fn prices(&self) -> HashMap<AssetId, Price> {
        self.assets
            .iter()
            .filter_map(|a| a.price().ok().map(|p| (a.id.clone(), p)))
            .collect()
    }
}
