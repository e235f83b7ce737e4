//! Entity lists and forms
//!
//! One list implementation serves every collection. A record type opts in
//! by implementing [`Entity`], which names its store key and how it is
//! searched.
//!
//! - [`EntityList`]: load, search, filter, create, replace-or-append, delete
//! - [`ListView`]: the Idle / Creating / Editing / ConfirmingDelete machine
//! - [`forms`]: raw field input composed into records
//!
//! Every mutation is load-all, change in memory, save-all.

pub mod forms;
pub mod view;

pub use forms::{AppointmentForm, FormError, PatientForm, RecordForm, TransactionForm};
pub use view::{ListView, ViewError, ViewState};

use crate::store::{LocalStore, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A record kept as one JSON array in the store
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Store key holding the collection
    const COLLECTION: &'static str;

    /// Human-readable name, used in messages
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Fresh identifier for a newly created record
    fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Search hook; `needle` is already trimmed and lowercased
    fn matches(&self, needle: &str) -> bool;

    /// Status value for status filters, `None` if the entity has none
    fn status(&self) -> Option<&'static str> {
        None
    }
}

/// Typed handle over one collection in the store
pub struct EntityList<E: Entity> {
    store: LocalStore,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityList<E> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<E: Entity> EntityList<E> {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Every record, in stored order
    pub fn all(&self) -> Vec<E> {
        self.store.load(E::COLLECTION)
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.all().into_iter().find(|r| r.id() == id)
    }

    /// Records matching `term`; a blank term returns everything
    pub fn search(&self, term: &str) -> Vec<E> {
        filter_records(self.all(), Some(term), None)
    }

    /// Records with the given status (`all` or blank disables the filter)
    pub fn filter_status(&self, status: &str) -> Vec<E> {
        filter_records(self.all(), None, Some(status))
    }

    /// Search and status filter together
    pub fn query(&self, term: Option<&str>, status: Option<&str>) -> Vec<E> {
        filter_records(self.all(), term, status)
    }

    pub fn count(&self) -> usize {
        self.all().len()
    }

    /// Append `record` under a freshly generated identifier
    pub fn create(&self, mut record: E) -> StoreResult<E> {
        record.set_id(E::new_id());
        let mut records = self.all();
        records.push(record.clone());
        self.store.save(E::COLLECTION, &records)?;

        tracing::info!(collection = E::COLLECTION, id = %record.id(), "Created {}", E::LABEL);
        Ok(record)
    }

    /// Replace the record with the same id, or append it if there is none
    pub fn update(&self, record: E) -> StoreResult<E> {
        let records = replace_or_append(self.all(), record.clone());
        self.store.save(E::COLLECTION, &records)?;

        tracing::info!(collection = E::COLLECTION, id = %record.id(), "Saved {}", E::LABEL);
        Ok(record)
    }

    /// Remove the record with `id`. Returns false, and writes nothing, if
    /// there was no such record.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let records = self.all();
        let before = records.len();
        let remaining: Vec<E> = records.into_iter().filter(|r| r.id() != id).collect();

        if remaining.len() == before {
            tracing::debug!(collection = E::COLLECTION, id = %id, "Delete of unknown id ignored");
            return Ok(false);
        }

        self.store.save(E::COLLECTION, &remaining)?;
        tracing::info!(collection = E::COLLECTION, id = %id, "Deleted {}", E::LABEL);
        Ok(true)
    }

    /// Overwrite the whole collection
    pub fn replace_all(&self, records: &[E]) -> StoreResult<()> {
        self.store.save(E::COLLECTION, records)
    }
}

/// `records` with `record` swapped in by id, or appended at the end
pub fn replace_or_append<E: Entity>(mut records: Vec<E>, record: E) -> Vec<E> {
    match records.iter().position(|r| r.id() == record.id()) {
        Some(index) => records[index] = record,
        None => records.push(record),
    }
    records
}

fn filter_records<E: Entity>(records: Vec<E>, term: Option<&str>, status: Option<&str>) -> Vec<E> {
    let needle = term
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    let status = status
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && s != "all");

    records
        .into_iter()
        .filter(|r| needle.as_deref().map(|n| r.matches(n)).unwrap_or(true))
        .filter(|r| match (&status, r.status()) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Appointment, Patient, PaymentStatus, Transaction};

    fn patient(name: &str, contact: &str) -> Patient {
        Patient {
            name: name.into(),
            contact: contact.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        let a = list.create(patient("Asha", "1")).unwrap();
        let b = list.create(patient("Ravi", "2")).unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(list.count(), 2);
        assert_eq!(list.get(&b.id).unwrap().name, "Ravi");
    }

    #[test]
    fn test_update_replaces_in_place() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        let a = list.create(patient("Asha", "1")).unwrap();
        let b = list.create(patient("Ravi", "2")).unwrap();

        let mut edited = a.clone();
        edited.name = "Asha Rao".into();
        list.update(edited).unwrap();

        let all = list.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Asha Rao");
        assert_eq!(all[1].id, b.id);
    }

    #[test]
    fn test_update_unknown_id_appends() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        list.create(patient("Asha", "1")).unwrap();

        let mut imported = patient("Imported", "3");
        imported.id = "legacy-7".into();
        list.update(imported).unwrap();

        let all = list.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, "legacy-7");
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let store = LocalStore::in_memory();
        let list: EntityList<Patient> = EntityList::new(store.clone());
        list.create(patient("Asha", "1")).unwrap();
        list.create(patient("Ravi", "2")).unwrap();
        let before = store.get_raw("patients");

        assert!(!list.delete("missing").unwrap());
        assert_eq!(store.get_raw("patients"), before);
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn test_delete_removes_only_target() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        let a = list.create(patient("Asha", "1")).unwrap();
        let b = list.create(patient("Ravi", "2")).unwrap();

        assert!(list.delete(&a.id).unwrap());
        let all = list.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b.id);
    }

    #[test]
    fn test_search_blank_returns_all() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        list.create(patient("Asha", "1")).unwrap();
        list.create(patient("Ravi", "2")).unwrap();

        assert_eq!(list.search("").len(), 2);
        assert_eq!(list.search("   ").len(), 2);
        assert_eq!(list.search("ASHA").len(), 1);
        assert!(list.search("nobody").is_empty());
    }

    #[test]
    fn test_status_filter() {
        let list: EntityList<Transaction> = EntityList::new(LocalStore::in_memory());
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Partial,
            PaymentStatus::Completed,
            PaymentStatus::Pending,
        ] {
            list.create(Transaction {
                patient_name: "Ravi".into(),
                status,
                ..Default::default()
            })
            .unwrap();
        }

        assert_eq!(list.filter_status("all").len(), 4);
        assert_eq!(list.filter_status("pending").len(), 2);
        assert_eq!(list.filter_status("Partial").len(), 1);
        assert_eq!(list.query(Some("ravi"), Some("completed")).len(), 1);
        assert_eq!(list.query(Some("sunita"), Some("pending")).len(), 0);
    }

    #[test]
    fn test_status_filter_on_entity_without_status() {
        let list: EntityList<Patient> = EntityList::new(LocalStore::in_memory());
        list.create(patient("Asha", "1")).unwrap();
        assert!(list.filter_status("pending").is_empty());
    }

    #[test]
    fn test_collections_are_separate() {
        let store = LocalStore::in_memory();
        let patients: EntityList<Patient> = EntityList::new(store.clone());
        let appointments: EntityList<Appointment> = EntityList::new(store.clone());

        patients.create(patient("Asha", "1")).unwrap();
        assert_eq!(appointments.count(), 0);
        assert!(store.get_raw("patients").is_some());
        assert!(store.get_raw("appointments").is_none());
    }
}
