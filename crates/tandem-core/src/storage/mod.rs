//! Persistence adapter.
//!
//! State is one JSON blob per user per subsystem, stored under keys of the
//! form `"<entity>_<user>"` (`checkins_alice`, `streaks_alice`, ...). The
//! full blob is loaded and rewritten on each mutation; there is no schema
//! migration and no conflict resolution. Single writer is assumed: two
//! processes writing the same key race last-write-wins.

mod kv;

pub use kv::KvStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Result, StorageError};

/// Key-value persistence seam.
///
/// Injected into the engine so tests can substitute [`MemoryStore`].
pub trait Store {
    /// Load the raw JSON blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load and deserialize the blob under `key`.
pub fn load_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    match store.load(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize `value` and store it under `key`.
pub fn save_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)?;
    Ok(())
}

/// Storage key for a user-scoped entity blob.
pub fn user_key(entity: &str, user_id: &str) -> String {
    format!("{entity}_{user_id}")
}

/// Returns `~/.config/tandem[-dev]/` based on TANDEM_ENV.
///
/// Set TANDEM_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TANDEM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tandem-dev")
    } else {
        base_dir.join("tandem")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| StorageError::QueryFailed("poisoned lock".into()))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| StorageError::QueryFailed("poisoned lock".into()))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load("checkins_alice").unwrap().is_none());

        store.save("checkins_alice", "[1,2,3]").unwrap();
        assert_eq!(store.load("checkins_alice").unwrap().unwrap(), "[1,2,3]");

        store.save("checkins_alice", "[]").unwrap();
        assert_eq!(store.load("checkins_alice").unwrap().unwrap(), "[]");
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        save_json(&store, "streaks_bob", &vec![1u32, 2, 3]).unwrap();

        let loaded: Option<Vec<u32>> = load_json(&store, "streaks_bob").unwrap();
        assert_eq!(loaded.unwrap(), vec![1, 2, 3]);

        let missing: Option<Vec<u32>> = load_json(&store, "streaks_carol").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_user_key_format() {
        assert_eq!(user_key("checkins", "alice"), "checkins_alice");
        assert_eq!(user_key("couple_score", "u-1"), "couple_score_u-1");
    }
}
