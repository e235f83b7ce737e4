//! # Clinicdesk
//!
//! Back office for a single dental clinic: patients, appointments and a
//! khatabook ledger kept in a local key-value store, with WhatsApp
//! confirmations and daily due-payment reminders.
//!
//! ## Modules
//!
//! - [`store`]: key-value persistence (memory, JSON files, SQLite)
//! - [`records`]: stored record types
//! - [`entity`]: collection CRUD, forms and the list/form view state
//! - [`notify`]: WhatsApp deep links, launchers and the outbox
//! - [`reminders`]: due-payment scan and its scheduler
//! - [`auth`]: doctor accounts and password resets
//! - [`dashboard`]: greeting, theme and summary counts
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clinicdesk::entity::{EntityList, PatientForm, RecordForm};
//! use clinicdesk::records::Patient;
//! use clinicdesk::store::LocalStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LocalStore::in_memory();
//!     let patients = EntityList::<Patient>::new(store);
//!
//!     let form = PatientForm {
//!         name: "Asha Rao".into(),
//!         contact: "9876543210".into(),
//!         ..Default::default()
//!     };
//!     let created = patients.create(form.compose(None)?)?;
//!
//!     println!("Created patient {}", created.id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod entity;
pub mod notify;
pub mod records;
pub mod reminders;
pub mod store;

pub use api::{build_router, serve, ApiError, AppState};
pub use config::{Config, ConfigError, LoadedConfig};
pub use entity::{Entity, EntityList, FormError, ListView, RecordForm};
pub use notify::{NotificationDispatcher, NotifyError, OutboundMessage};
pub use records::{Appointment, Patient, Transaction};
pub use reminders::{DuePaymentScanner, ReminderScheduler, ScanReport};
pub use store::{LocalStore, StoreError, StoreResult};
