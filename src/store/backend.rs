//! Key-value backends
//!
//! The store is a flat namespace of string keys holding string values,
//! the same shape as browser `localStorage`. Backends only move strings;
//! JSON handling lives in [`LocalStore`](super::LocalStore).

use super::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Get/set-by-key repository injected into everything that persists state
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Reject keys that cannot be used as a file name or table key.
///
/// Allowed: ASCII alphanumerics, `_`, `-` and `.` (not leading).
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key.len() <= 200
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(entries.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
