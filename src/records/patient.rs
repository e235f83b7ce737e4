//! Patient records

use crate::entity::Entity;
use serde::{Deserialize, Serialize};

/// A clinic patient
///
/// Appointments and transactions point at `id` by value only; nothing
/// checks that the patient still exists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Phone number as typed
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Fields written by other front ends, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entity for Patient {
    const COLLECTION: &'static str = "patients";
    const LABEL: &'static str = "Patient";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.contact.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.id.to_lowercase().contains(needle)
    }
}
