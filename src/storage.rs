//! Flat key-value persistence
//!
//! Campsites, emergency contacts and the selected region are each stored as a
//! single serialized blob under one well-known key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use fjall::Keyspace;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{HandsUpError, Result};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn storage_err(err: impl std::fmt::Display) -> HandsUpError {
    HandsUpError::storage(err.to_string())
}

/// On-disk store backed by a fjall keyspace
pub struct FjallStore {
    _db: fjall::Database,
    store: Keyspace,
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let db = fjall::Database::builder(path).open().map_err(storage_err)?;
        let store = db
            .keyspace("handsup", fjall::KeyspaceCreateOptions::default)
            .map_err(storage_err)?;
        debug!("Opened key-value store at {}", path.display());
        Ok(Self { _db: db, store })
    }
}

impl KeyValueStore for FjallStore {
    #[tracing::instrument(name = "kv_get", level = "debug", skip(self))]
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .store
            .get(key.as_bytes().to_vec())
            .map_err(storage_err)?;
        Ok(value.map(|v| v.to_vec()))
    }

    #[tracing::instrument(name = "kv_put", level = "debug", skip(self, value), fields(bytes = value.len()))]
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.store
            .insert(key.as_bytes().to_vec(), value.to_vec())
            .map_err(storage_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store
            .remove(key.as_bytes().to_vec())
            .map_err(storage_err)?;
        Ok(())
    }
}

/// Process-local store; nothing survives a restart
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(storage_err)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(storage_err)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(storage_err)?;
        entries.remove(key);
        Ok(())
    }
}

/// Serialize `value` as JSON and store it under `key`
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, &bytes)
}

/// Load a JSON blob, falling back to `T::default()` when the key is missing
/// or the blob cannot be read or decoded
pub fn load_json_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Discarding undecodable data under '{}': {}", key, e);
            T::default()
        }),
        Ok(None) => {
            debug!("Key '{}' not found", key);
            T::default()
        }
        Err(e) => {
            warn!("Failed to read '{}': {}", key, e);
            T::default()
        }
    }
}
