//! Record forms
//!
//! A form holds the raw strings a user typed. [`RecordForm::compose`]
//! checks required fields and builds the stored record, carrying over the
//! id, attachments and unknown fields of the record being edited.
//!
//! Only required fields block a submit. Amounts and dates are saved as
//! typed; an amount that does not parse makes computed fields `NaN`.

use super::Entity;
use crate::records::{
    format_amount, parse_amount, parse_date, parse_datetime, AppointmentStatus, Attachment,
    Appointment, Patient, PaymentStatus, Transaction,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

/// Raw input that becomes a record on submit
pub trait RecordForm {
    type Record: Entity;

    /// Build the record to save. `existing` is the record being edited,
    /// `None` when creating.
    fn compose(self, existing: Option<&Self::Record>) -> Result<Self::Record, FormError>;
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

/// Unparseable amounts become `NaN` so they poison whatever they feed
fn amount(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientForm {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

impl RecordForm for PatientForm {
    type Record = Patient;

    fn compose(self, existing: Option<&Patient>) -> Result<Patient, FormError> {
        let name = required("name", &self.name)?;
        let contact = required("contact", &self.contact)?;

        let mut patient = existing.cloned().unwrap_or_default();
        patient.name = name;
        patient.contact = contact;
        patient.email = self.email.trim().to_string();
        patient.address = self.address.trim().to_string();
        patient.notes = self.notes.trim().to_string();
        Ok(patient)
    }
}

/// Appointment booking form
///
/// Date and time arrive as separate inputs. A date that already carries a
/// time (`2024-01-01T10:00`) is accepted with the time input left blank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppointmentForm {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: String,
    pub title: String,
    pub treatment: String,
    pub description: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub cost: String,
    pub paid_amount: String,
    #[serde(rename = "sendWhatsApp")]
    pub send_whatsapp: bool,
    /// Newly attached files, appended to any already on the record
    pub files: Vec<Attachment>,
}

impl AppointmentForm {
    /// Copy contact details from the chosen patient. An id with no match
    /// clears them.
    pub fn select_patient(&mut self, patients: &[Patient], patient_id: &str) {
        self.patient_id = patient_id.to_string();
        match patients.iter().find(|p| p.id == patient_id) {
            Some(patient) => {
                self.patient_name = patient.name.clone();
                self.patient_phone = patient.contact.clone();
                self.patient_email = patient.email.clone();
            }
            None => {
                self.patient_name.clear();
                self.patient_phone.clear();
                self.patient_email.clear();
            }
        }
    }

    pub fn attach(&mut self, name: &str, bytes: &[u8]) {
        self.files.push(Attachment::from_bytes(name, bytes));
    }

    /// `YYYY-MM-DDTHH:MM` from the date and time inputs, or the joined
    /// text as typed when it does not parse
    fn combined_datetime(&self) -> Result<String, FormError> {
        let date = required("appointmentDate", &self.appointment_date)?;
        let time = self.appointment_time.trim();

        let combined = if time.is_empty() {
            if !date.contains('T') {
                return Err(FormError::Missing("appointmentTime"));
            }
            date
        } else {
            format!("{}T{}", &date[..date.find('T').unwrap_or(date.len())], time)
        };

        Ok(match parse_datetime(&combined) {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M").to_string(),
            None => combined,
        })
    }
}

impl RecordForm for AppointmentForm {
    type Record = Appointment;

    fn compose(self, existing: Option<&Appointment>) -> Result<Appointment, FormError> {
        let patient_id = required("patientId", &self.patient_id)?;
        let title = required("title", &self.title)?;
        let appointment_date = self.combined_datetime()?;

        let status = if self.status.trim().is_empty() {
            existing.map(|a| a.status).unwrap_or_default()
        } else {
            self.status
                .parse::<AppointmentStatus>()
                .map_err(FormError::InvalidStatus)?
        };

        let cost = amount(&self.cost);
        let paid = amount(&self.paid_amount);

        let mut appointment = existing.cloned().unwrap_or_default();
        appointment.patient_id = patient_id;
        appointment.patient_name = self.patient_name.trim().to_string();
        appointment.patient_phone = self.patient_phone.trim().to_string();
        appointment.patient_email = self.patient_email.trim().to_string();
        appointment.title = title;
        appointment.treatment = self.treatment.trim().to_string();
        appointment.description = self.description;
        appointment.appointment_date = appointment_date;
        appointment.status = status;
        appointment.cost = self.cost.trim().to_string();
        appointment.paid_amount = self.paid_amount.trim().to_string();
        appointment.pending_amount = format_amount(cost - paid);
        appointment.send_whatsapp = self.send_whatsapp;
        appointment.files.extend(self.files);
        Ok(appointment)
    }
}

/// Khatabook entry form
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionForm {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub date: String,
    pub amount: String,
    pub payment_type: String,
    pub description: String,
    pub status: String,
    pub due_date: String,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            patient_id: String::new(),
            patient_name: String::new(),
            patient_phone: String::new(),
            date: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            amount: String::new(),
            payment_type: "cash".to_string(),
            description: String::new(),
            status: "pending".to_string(),
            due_date: String::new(),
        }
    }
}

impl TransactionForm {
    /// Fill name and phone from the chosen patient, leaving them as typed
    /// when the id is unknown
    pub fn select_patient(&mut self, patients: &[Patient], patient_id: &str) {
        self.patient_id = patient_id.to_string();
        if let Some(patient) = patients.iter().find(|p| p.id == patient_id) {
            self.patient_name = patient.name.clone();
            self.patient_phone = patient.contact.clone();
        }
    }
}

impl RecordForm for TransactionForm {
    type Record = Transaction;

    fn compose(self, existing: Option<&Transaction>) -> Result<Transaction, FormError> {
        let patient_id = required("patientId", &self.patient_id)?;
        let patient_name = required("patientName", &self.patient_name)?;
        let patient_phone = required("patientPhone", &self.patient_phone)?;
        let date = required("date", &self.date)?;
        let amount_text = required("amount", &self.amount)?;

        let due_date = match self.due_date.trim() {
            "" => None,
            due => Some(
                parse_date(due)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| due.to_string()),
            ),
        };

        let status = if self.status.trim().is_empty() {
            PaymentStatus::Pending
        } else {
            self.status
                .parse::<PaymentStatus>()
                .map_err(FormError::InvalidStatus)?
        };

        let payment_type = match self.payment_type.trim() {
            "" => "cash".to_string(),
            other => other.to_string(),
        };

        let mut txn = existing.cloned().unwrap_or_default();
        txn.patient_id = patient_id;
        txn.patient_name = patient_name;
        txn.patient_phone = patient_phone;
        txn.date = date;
        txn.amount = amount_text;
        txn.payment_type = payment_type;
        txn.description = self.description;
        txn.status = status;
        txn.due_date = due_date;
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaning() -> AppointmentForm {
        AppointmentForm {
            patient_id: "p1".into(),
            title: "Cleaning".into(),
            appointment_date: "2024-01-01T10:00".into(),
            cost: "500".into(),
            paid_amount: "200".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pending_amount_computed() {
        let appointment = cleaning().compose(None).unwrap();
        assert_eq!(appointment.pending_amount, "300");
        assert_eq!(appointment.appointment_date, "2024-01-01T10:00");
        assert_eq!(appointment.status, AppointmentStatus::Pending);
    }

    #[test]
    fn test_pending_amount_recomputed_on_edit() {
        let first = cleaning().compose(None).unwrap();

        let mut form = cleaning();
        form.paid_amount = "500".into();
        let edited = form.compose(Some(&first)).unwrap();
        assert_eq!(edited.pending_amount, "0");
    }

    #[test]
    fn test_blank_amounts_count_as_zero() {
        let mut form = cleaning();
        form.cost = String::new();
        form.paid_amount = String::new();
        assert_eq!(form.compose(None).unwrap().pending_amount, "0");

        let mut form = cleaning();
        form.paid_amount = String::new();
        assert_eq!(form.compose(None).unwrap().pending_amount, "500");
    }

    #[test]
    fn test_non_numeric_amount_saves_nan() {
        let mut form = cleaning();
        form.cost = "abc".into();
        let appointment = form.compose(None).unwrap();
        assert_eq!(appointment.cost, "abc");
        assert_eq!(appointment.pending_amount, "NaN");

        let mut form = cleaning();
        form.paid_amount = "two hundred".into();
        assert_eq!(form.compose(None).unwrap().pending_amount, "NaN");
    }

    #[test]
    fn test_date_and_time_combined() {
        let mut form = cleaning();
        form.appointment_date = "2024-02-03".into();
        form.appointment_time = "09:45".into();
        assert_eq!(form.compose(None).unwrap().appointment_date, "2024-02-03T09:45");

        let mut form = cleaning();
        form.appointment_date = "2024-02-03".into();
        assert_eq!(
            form.compose(None).unwrap_err(),
            FormError::Missing("appointmentTime")
        );

        let mut form = cleaning();
        form.appointment_date = "2024-13-40".into();
        form.appointment_time = "09:45".into();
        assert_eq!(form.compose(None).unwrap().appointment_date, "2024-13-40T09:45");
    }

    #[test]
    fn test_required_fields() {
        let mut form = cleaning();
        form.title = "  ".into();
        assert_eq!(form.compose(None).unwrap_err(), FormError::Missing("title"));

        let err = PatientForm::default().compose(None).unwrap_err();
        assert_eq!(err, FormError::Missing("name"));
    }

    #[test]
    fn test_select_patient() {
        let patients = vec![Patient {
            id: "p1".into(),
            name: "Asha Rao".into(),
            contact: "9876543210".into(),
            email: "asha@example.com".into(),
            ..Default::default()
        }];

        let mut form = cleaning();
        form.select_patient(&patients, "p1");
        assert_eq!(form.patient_name, "Asha Rao");
        assert_eq!(form.patient_phone, "9876543210");

        form.select_patient(&patients, "p9");
        assert_eq!(form.patient_id, "p9");
        assert!(form.patient_name.is_empty());
        assert!(form.patient_phone.is_empty());
    }

    #[test]
    fn test_edit_keeps_files_and_extra() {
        let mut form = cleaning();
        form.attach("xray.png", b"png");
        let mut first = form.compose(None).unwrap();
        first.id = "a1".into();
        first
            .extra
            .insert("room".into(), serde_json::Value::String("2".into()));

        let mut form = cleaning();
        form.attach("report.pdf", b"pdf");
        let edited = form.compose(Some(&first)).unwrap();

        assert_eq!(edited.id, "a1");
        assert_eq!(edited.files.len(), 2);
        assert_eq!(edited.files[1].mime_type, "application/pdf");
        assert_eq!(edited.extra["room"], "2");
    }

    #[test]
    fn test_transaction_form() {
        let form = TransactionForm {
            patient_id: "p1".into(),
            patient_name: "Ravi".into(),
            patient_phone: "9876543210".into(),
            date: "2024-06-01".into(),
            amount: "1200".into(),
            status: "Partial".into(),
            due_date: "2024-06-10".into(),
            ..Default::default()
        };
        let txn = form.compose(None).unwrap();
        assert_eq!(txn.status, PaymentStatus::Partial);
        assert_eq!(txn.payment_type, "cash");
        assert_eq!(txn.due_date.as_deref(), Some("2024-06-10"));
    }

    #[test]
    fn test_transaction_form_blank_due_date_is_none() {
        let form = TransactionForm {
            patient_id: "p1".into(),
            patient_name: "Ravi".into(),
            patient_phone: "9876543210".into(),
            amount: "1200".into(),
            ..Default::default()
        };
        let txn = form.compose(None).unwrap();
        assert_eq!(txn.due_date, None);
        assert_eq!(txn.status, PaymentStatus::Pending);

    }

    #[test]
    fn test_transaction_form_keeps_unparsed_input() {
        let form = TransactionForm {
            patient_id: "p1".into(),
            patient_name: "Ravi".into(),
            patient_phone: "1".into(),
            date: "yesterday".into(),
            amount: "abc".into(),
            due_date: "next week".into(),
            ..Default::default()
        };
        let txn = form.compose(None).unwrap();
        assert_eq!(txn.amount, "abc");
        assert_eq!(txn.date, "yesterday");
        assert_eq!(txn.due_date.as_deref(), Some("next week"));
        assert_eq!(txn.amount_value(), None);
        assert_eq!(txn.due_on(), None);
    }
}
