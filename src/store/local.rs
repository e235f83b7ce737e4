//! Named JSON blobs over a [`KeyValueStore`]
//!
//! Reads are forgiving: a missing key, a backend failure or malformed JSON
//! all come back as an empty collection. Writes always replace the whole
//! blob. There is no guard between a load and the following save, so two
//! writers racing on one key lose updates (last write wins).

use super::backend::KeyValueStore;
use super::error::StoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed accessor for the clinic's named blobs
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store over a fresh [`MemoryStore`](super::MemoryStore)
    pub fn in_memory() -> Self {
        Self::new(Arc::new(super::MemoryStore::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Load the collection stored under `key`.
    ///
    /// Elements that do not parse as `T` are dropped with a warning so one
    /// bad record does not hide the rest of the blob.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read collection");
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Malformed collection, treating as empty");
                return Vec::new();
            }
        };

        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key = %key, index, error = %e, "Skipping unreadable record");
                    None
                }
            })
            .collect()
    }

    /// Overwrite the collection stored under `key`
    pub fn save<T: Serialize>(&self, key: &str, records: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(key, &raw)?;
        tracing::debug!(key = %key, count = records.len(), "Saved collection");
        Ok(())
    }

    /// Load a single JSON object, `None` if absent or malformed
    pub fn load_object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read object");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Malformed object, ignoring");
                None
            }
        }
    }

    /// Overwrite a single JSON object
    pub fn save_object<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    /// Raw string value (theme, reminder markers)
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read value");
                None
            }
        }
    }

    pub fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        self.backend.set(key, value)
    }

    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.backend.remove(key)
    }

    pub fn keys(&self) -> StoreResult<Vec<String>> {
        self.backend.keys()
    }
}
