//! Dashboard summary and theme

use crate::auth::SESSION_KEY;
use crate::config::ClinicConfig;
use crate::entity::EntityList;
use crate::records::{Appointment, DoctorProfile, Patient, PaymentStatus, Transaction};
use crate::store::{LocalStore, StoreResult};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Anything but `dark` reads as light
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Good Morning, Dr. Meera` and so on, by hour of day
pub fn greeting(hour: u32, profile: &DoctorProfile) -> String {
    let part = match hour {
        5..=11 => "Morning",
        12..=15 => "Afternoon",
        16..=19 => "Evening",
        _ => "Night",
    };
    format!("Good {}, Dr. {}", part, profile.first_name())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub greeting: String,
    pub doctor: DoctorProfile,
    pub theme: Theme,
    pub patient_count: usize,
    pub appointment_count: usize,
    pub transaction_count: usize,
    pub todays_appointments: Vec<Appointment>,
    /// Sum of `amount` over ledger entries still pending
    pub pending_total: f64,
}

#[derive(Clone)]
pub struct Dashboard {
    store: LocalStore,
    clinic: ClinicConfig,
}

impl Dashboard {
    pub fn new(store: LocalStore, clinic: ClinicConfig) -> Self {
        Self { store, clinic }
    }

    /// Signed-in doctor, or the clinic's configured doctor
    pub fn profile(&self) -> DoctorProfile {
        self.store
            .load_object(SESSION_KEY)
            .unwrap_or_else(|| DoctorProfile {
                name: self.clinic.doctor_name.clone(),
                email: self.clinic.doctor_email.clone(),
                role: self.clinic.doctor_role.clone(),
                profile_pic: None,
            })
    }

    pub fn theme(&self) -> Theme {
        Theme::from_stored(self.store.get_raw(THEME_KEY).as_deref())
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        self.store.set_raw(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> StoreResult<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn todays_appointments(&self, today: NaiveDate) -> Vec<Appointment> {
        EntityList::<Appointment>::new(self.store.clone())
            .all()
            .into_iter()
            .filter(|a| a.is_on(today))
            .collect()
    }

    pub fn summary(&self, now: NaiveDateTime) -> DashboardSummary {
        let patients = EntityList::<Patient>::new(self.store.clone()).count();
        let appointments = EntityList::<Appointment>::new(self.store.clone()).count();
        let transactions = EntityList::<Transaction>::new(self.store.clone()).all();
        let profile = self.profile();

        DashboardSummary {
            greeting: greeting(now.hour(), &profile),
            doctor: profile,
            theme: self.theme(),
            patient_count: patients,
            appointment_count: appointments,
            transaction_count: transactions.len(),
            todays_appointments: self.todays_appointments(now.date()),
            pending_total: pending_total(&transactions),
        }
    }
}

/// Unparseable amounts are left out of the total
pub fn pending_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.status == PaymentStatus::Pending)
        .filter_map(Transaction::amount_value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> DoctorProfile {
        DoctorProfile {
            name: name.into(),
            email: String::new(),
            role: String::new(),
            profile_pic: None,
        }
    }

    #[test]
    fn test_greeting_boundaries() {
        let doc = profile("Dr. Asrani");
        assert_eq!(greeting(4, &doc), "Good Night, Dr. Asrani");
        assert_eq!(greeting(5, &doc), "Good Morning, Dr. Asrani");
        assert_eq!(greeting(11, &doc), "Good Morning, Dr. Asrani");
        assert_eq!(greeting(12, &doc), "Good Afternoon, Dr. Asrani");
        assert_eq!(greeting(16, &doc), "Good Evening, Dr. Asrani");
        assert_eq!(greeting(20, &doc), "Good Night, Dr. Asrani");
        assert_eq!(greeting(9, &profile("Meera Shah")), "Good Morning, Dr. Meera");
    }

    #[test]
    fn test_theme_toggle_persists() {
        let store = LocalStore::in_memory();
        let dash = Dashboard::new(store.clone(), ClinicConfig::default());
        assert_eq!(dash.theme(), Theme::Light);

        assert_eq!(dash.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(store.get_raw(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(dash.toggle_theme().unwrap(), Theme::Light);

        store.set_raw(THEME_KEY, "solarized").unwrap();
        assert_eq!(dash.theme(), Theme::Light);
    }

    #[test]
    fn test_profile_defaults_to_clinic_doctor() {
        let dash = Dashboard::new(LocalStore::in_memory(), ClinicConfig::default());
        let profile = dash.profile();
        assert_eq!(profile.name, "Dr. Asrani");
        assert_eq!(profile.role, "Dentist");
    }

    #[test]
    fn test_summary() {
        let store = LocalStore::in_memory();
        store
            .save(
                "patients",
                &[Patient {
                    id: "p1".into(),
                    name: "Asha".into(),
                    ..Default::default()
                }],
            )
            .unwrap();
        store
            .save(
                "appointments",
                &[
                    Appointment {
                        id: "a1".into(),
                        appointment_date: "2024-06-10T09:30".into(),
                        ..Default::default()
                    },
                    Appointment {
                        id: "a2".into(),
                        appointment_date: "2024-06-11T09:30".into(),
                        ..Default::default()
                    },
                ],
            )
            .unwrap();

        let txn = |id: &str, amount: &str, status| Transaction {
            id: id.into(),
            amount: amount.into(),
            status,
            ..Default::default()
        };
        store
            .save(
                "transactions",
                &[
                    txn("t1", "500", PaymentStatus::Pending),
                    txn("t2", "250.5", PaymentStatus::Pending),
                    txn("t3", "1000", PaymentStatus::Partial),
                    txn("t4", "n/a", PaymentStatus::Pending),
                ],
            )
            .unwrap();

        let dash = Dashboard::new(store, ClinicConfig::default());
        let now = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let summary = dash.summary(now);

        assert_eq!(summary.patient_count, 1);
        assert_eq!(summary.appointment_count, 2);
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.todays_appointments.len(), 1);
        assert_eq!(summary.todays_appointments[0].id, "a1");
        assert_eq!(summary.pending_total, 750.5);
        assert_eq!(summary.greeting, "Good Afternoon, Dr. Asrani");
    }
}
