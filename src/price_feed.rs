// Price Feed Integration
//
// This module abstracts how the ledger receives prices. Where the snapshots
// come from (a market-data REST API, a websocket, a replay file) is the
// feed's concern. The ledger only ever sees {asset id, price} pairs.

use crate::types::{AssetId, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One tradable asset as reported by the feed, with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Raw feed value. Not guaranteed positive; see [`Asset::price`].
    pub current_price: Decimal,
    #[serde(default)]
    pub price_change_percentage_24h: Decimal,
}

impl Asset {
    pub fn new(id: &str, symbol: &str, name: &str, current_price: Decimal) -> Self {
        Self {
            id: AssetId::new(id),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: None,
            current_price,
            price_change_percentage_24h: Decimal::ZERO,
        }
    }

    pub fn price(&self) -> Result<Price, PriceFeedError> {
        Price::new(self.current_price).ok_or_else(|| PriceFeedError::InvalidPrice {
            asset_id: self.id.clone(),
            price: self.current_price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceFeedError {
    #[error("Price feed has no more snapshots")]
    Exhausted,

    #[error("Invalid price {price} for asset {asset_id}")]
    InvalidPrice { asset_id: AssetId, price: Decimal },
}

/// A source of periodic asset snapshots. Each call returns the full list.
pub trait PriceFeed {
    fn poll(&mut self) -> Result<Vec<Asset>, PriceFeedError>;
}

/// Replays a fixed sequence of snapshots. Deterministic, no I/O.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    snapshots: VecDeque<Vec<Asset>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: Vec<Asset>) -> Self {
        self.snapshots.push_back(snapshot);
        self
    }

    /// Convenience for single-asset scripts: one snapshot per price.
    pub fn from_prices(id: &str, symbol: &str, name: &str, prices: &[Decimal]) -> Self {
        let snapshots = prices
            .iter()
            .map(|p| vec![Asset::new(id, symbol, name, *p)])
            .collect();
        Self { snapshots }
    }

    pub fn remaining(&self) -> usize {
        self.snapshots.len()
    }
}

impl PriceFeed for ScriptedFeed {
    fn poll(&mut self) -> Result<Vec<Asset>, PriceFeedError> {
        self.snapshots.pop_front().ok_or(PriceFeedError::Exhausted)
    }
}
