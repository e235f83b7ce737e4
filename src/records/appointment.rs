//! Appointment records

use super::types::{lenient_string, parse_datetime, AppointmentStatus, Attachment};
use crate::entity::Entity;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A scheduled visit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    /// Free-text reference to a [`Patient`](super::Patient) id
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub patient_email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub description: String,
    /// Local date-time, `YYYY-MM-DDTHH:MM`
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paid_amount: String,
    /// `cost - paidAmount` as of the last form submit
    #[serde(default, deserialize_with = "lenient_string")]
    pub pending_amount: String,
    #[serde(default)]
    pub files: Vec<Attachment>,
    #[serde(default, rename = "sendWhatsApp")]
    pub send_whatsapp: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Appointment {
    /// When the appointment takes place, if the stored value parses
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.appointment_date)
    }

    /// True when the appointment falls on `day`
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.scheduled_at().map(|dt| dt.date() == day).unwrap_or(false)
    }

    /// Drop the attachment at `index`; false if out of range
    pub fn remove_file(&mut self, index: usize) -> bool {
        if index < self.files.len() {
            self.files.remove(index);
            true
        } else {
            false
        }
    }

    /// Whether a confirmation should be sent on save
    pub fn wants_notification(&self) -> bool {
        self.send_whatsapp && !self.patient_phone.trim().is_empty()
    }
}

impl Entity for Appointment {
    const COLLECTION: &'static str = "appointments";
    const LABEL: &'static str = "Appointment";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.patient_id.to_lowercase().contains(needle)
            || self.treatment.to_lowercase().contains(needle)
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }
}
