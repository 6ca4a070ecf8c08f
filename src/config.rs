// 7.0 config.rs: all settings in one place. starting cash, leverage bound, cadence.
// 7.1 env overrides live in from_env_map so tests can feed a plain map.

use crate::types::Quote;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_STORAGE_KEY: &str = "crypto-futures-storage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    // balance a fresh or reset wallet starts with
    pub starting_balance: Quote,
    // upper bound the caller clamps leverage to. the ledger itself only requires >= 1
    pub max_leverage: u32,
    // maximum number of events to retain in memory
    pub max_events: usize,
    // fixed name the whole state blob is stored under
    pub storage_key: String,
    // how often the caller should poll the price feed
    pub price_refresh_interval_ms: u64,
    // single-asset price patches closer together than this are dropped
    pub min_price_update_interval_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_balance: Quote::new(dec!(10000)), // $10,000 USDT
            max_leverage: 100,
            max_events: 100_000,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            price_refresh_interval_ms: 30_000,
            min_price_update_interval_ms: 1_000,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = env_map.get("PAPER_STARTING_BALANCE") {
            let value = Decimal::from_str(raw).map_err(|_| {
                ConfigError::InvalidValue("PAPER_STARTING_BALANCE".to_string(), "must be a decimal".to_string())
            })?;
            config.starting_balance = Quote::new(value);
        }

        if let Some(raw) = env_map.get("PAPER_MAX_LEVERAGE") {
            config.max_leverage = raw.parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue("PAPER_MAX_LEVERAGE".to_string(), "must be a valid u32".to_string())
            })?;
        }

        if let Some(raw) = env_map.get("PAPER_STORAGE_KEY") {
            config.storage_key = raw.clone();
        }

        if let Some(raw) = env_map.get("PAPER_REFRESH_INTERVAL_MS") {
            config.price_refresh_interval_ms = raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue("PAPER_REFRESH_INTERVAL_MS".to_string(), "must be a valid u64".to_string())
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_balance.is_positive() {
            return Err(ConfigError::InvalidValue(
                "starting_balance".to_string(),
                "must be positive".to_string(),
            ));
        }

        if self.max_leverage == 0 {
            return Err(ConfigError::InvalidValue(
                "max_leverage".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "storage_key".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
