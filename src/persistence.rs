//! Persistence boundary.
//!
//! The whole ledger state is one JSON object stored under a fixed key. There
//! is no versioning or migration: a blob that does not deserialize into
//! [`LedgerState`] is treated as if nothing were stored.

use crate::ledger::LedgerState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize ledger state: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait StateStore {
    /// `Ok(None)` when nothing usable is stored.
    fn load(&self) -> Result<Option<LedgerState>, StoreError>;

    fn save(&mut self, state: &LedgerState) -> Result<(), StoreError>;
}

fn decode_state(raw: &str, origin: &str) -> Option<LedgerState> {
    match serde_json::from_str::<LedgerState>(raw) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(origin, error = %e, "stored ledger state has unexpected shape, discarding");
            None
        }
    }
}

/// `<dir>/<storage_key>.json` on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{storage_key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(decode_state(&raw, &self.path.display().to_string()))
    }

    fn save(&mut self, state: &LedgerState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Keeps the serialized blob in memory. Same round trip as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { blob: Some(raw.into()) }
    }

    pub fn raw(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        Ok(self.blob.as_deref().and_then(|raw| decode_state(raw, "memory")))
    }

    fn save(&mut self, state: &LedgerState) -> Result<(), StoreError> {
        self.blob = Some(serde_json::to_string(state)?);
        Ok(())
    }
}
