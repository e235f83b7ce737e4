//! Clinicdesk Local Store
//!
//! Persistence for every clinic collection:
//!
//! - **backend**: the [`KeyValueStore`] trait and the in-memory backend
//! - **file**: one JSON file per key in a data directory
//! - **sqlite**: one row per key in a SQLite table
//! - **local**: [`LocalStore`], the typed load/save accessor
//! - **error**: error types
//!
//! # Layout
//!
//! ```text
//! patients          JSON array of Patient
//! appointments      JSON array of Appointment
//! transactions      JSON array of Transaction
//! doctors           JSON array of Doctor
//! password_resets   JSON array of PasswordResetToken
//! outbox            JSON array of OutboundMessage
//! doctor            JSON object, signed-in DoctorProfile
//! theme             "light" | "dark"
//! reminder_<id>_<YYYY-MM-DD>   "sent"
//! ```
//!
//! # Example
//!
//! ```rust
//! use clinicdesk::store::LocalStore;
//!
//! let store = LocalStore::in_memory();
//! store.save("patients", &vec![serde_json::json!({"id": "p1", "name": "Asha"})]).unwrap();
//! let patients: Vec<serde_json::Value> = store.load("patients");
//! assert_eq!(patients.len(), 1);
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod local;
pub mod sqlite;

pub use backend::{validate_key, KeyValueStore, MemoryStore};
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use local::LocalStore;
pub use sqlite::SqliteStore;

use crate::config::{StorageBackend, StorageConfig};
use std::sync::Arc;

/// Open the backend selected in the configuration
pub fn open(config: &StorageConfig) -> StoreResult<LocalStore> {
    let data_dir = config.data_path();

    let backend: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(&data_dir)?),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(&data_dir)?),
    };

    tracing::info!(
        backend = backend.backend_name(),
        data_dir = %config.data_dir,
        "Store opened"
    );

    Ok(LocalStore::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_each_backend() {
        let dir = tempdir().unwrap();
        for backend in [
            StorageBackend::Memory,
            StorageBackend::File,
            StorageBackend::Sqlite,
        ] {
            let config = StorageConfig {
                backend,
                data_dir: dir.path().to_string_lossy().to_string(),
            };
            let store = open(&config).unwrap();
            store.set_raw("theme", "dark").unwrap();
            assert_eq!(store.get_raw("theme").as_deref(), Some("dark"));
        }
    }
}
