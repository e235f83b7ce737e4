//! Doctor directory

use super::AuthError;
use crate::records::{Doctor, DoctorProfile};
use crate::store::{LocalStore, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};

pub const DOCTORS_KEY: &str = "doctors";

/// Signed-in doctor profile
pub const SESSION_KEY: &str = "doctor";

#[derive(Clone)]
pub struct DoctorDirectory {
    store: LocalStore,
}

impl DoctorDirectory {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Vec<Doctor> {
        self.store.load(DOCTORS_KEY)
    }

    /// Add a doctor. Emails are unique ignoring case.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Doctor, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let mut doctors = self.all();
        if doctors.iter().any(|d| d.email.eq_ignore_ascii_case(email)) {
            return Err(AuthError::DuplicateEmail);
        }

        let doctor = Doctor {
            id: format!("d{}", now.timestamp_millis()),
            name: name.trim().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: "Admin".to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        doctors.push(doctor.clone());
        self.store.save(DOCTORS_KEY, &doctors)?;

        tracing::info!(doctor_id = %doctor.id, "Doctor registered");
        Ok(doctor)
    }

    /// Case-insensitive email, exact password
    pub fn authenticate(&self, email: &str, password: &str) -> Option<Doctor> {
        let email = email.trim();
        self.all()
            .into_iter()
            .find(|d| d.email.eq_ignore_ascii_case(email) && d.password == password)
    }

    /// Authenticate and remember the doctor as signed in
    pub fn login(&self, email: &str, password: &str) -> Result<DoctorProfile, AuthError> {
        let doctor = self
            .authenticate(email, password)
            .ok_or(AuthError::InvalidCredentials)?;

        let profile = doctor.profile();
        self.store.save_object(SESSION_KEY, &profile)?;
        tracing::info!(doctor_id = %doctor.id, "Doctor signed in");
        Ok(profile)
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.store.remove(SESSION_KEY)
    }

    pub fn by_id(&self, id: &str) -> Option<Doctor> {
        self.all().into_iter().find(|d| d.id == id)
    }

    pub fn by_email(&self, email: &str) -> Option<Doctor> {
        let email = email.trim();
        self.all()
            .into_iter()
            .find(|d| d.email.eq_ignore_ascii_case(email))
    }

    /// Replace the password of the doctor with `email`. False if there is
    /// no such doctor.
    pub fn update_password(&self, email: &str, new_password: &str) -> StoreResult<bool> {
        let email = email.trim();
        let mut doctors = self.all();
        let Some(doctor) = doctors
            .iter_mut()
            .find(|d| d.email.eq_ignore_ascii_case(email))
        else {
            return Ok(false);
        };

        doctor.password = new_password.to_string();
        self.store.save(DOCTORS_KEY, &doctors)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn directory() -> DoctorDirectory {
        DoctorDirectory::new(LocalStore::in_memory())
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_register() {
        let dir = directory();
        let doctor = dir
            .register("Dr. Meera", "meera@clinic.in", "secret1", at(1_700_000_000_000))
            .unwrap();
        assert_eq!(doctor.id, "d1700000000000");
        assert_eq!(doctor.role, "Admin");
        assert_eq!(doctor.created_at, "2023-11-14T22:13:20.000Z");
        assert_eq!(dir.all().len(), 1);
    }

    #[test]
    fn test_duplicate_email_any_case() {
        let dir = directory();
        dir.register("A", "meera@clinic.in", "x", at(1)).unwrap();
        let err = dir.register("B", "MEERA@clinic.in", "y", at(2)).unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(err.to_string(), "Doctor with this email already exists");
    }

    #[test]
    fn test_authenticate() {
        let dir = directory();
        dir.register("A", "meera@clinic.in", "secret1", at(1)).unwrap();

        assert!(dir.authenticate("Meera@Clinic.in", "secret1").is_some());
        assert!(dir.authenticate("meera@clinic.in", "Secret1").is_none());
        assert!(dir.authenticate("other@clinic.in", "secret1").is_none());
    }

    #[test]
    fn test_login_logout_session() {
        let store = LocalStore::in_memory();
        let dir = DoctorDirectory::new(store.clone());
        dir.register("Dr. Meera Shah", "meera@clinic.in", "secret1", at(1)).unwrap();

        assert!(matches!(
            dir.login("meera@clinic.in", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));

        let profile = dir.login("meera@clinic.in", "secret1").unwrap();
        assert_eq!(profile.first_name(), "Meera");
        let stored: DoctorProfile = store.load_object(SESSION_KEY).unwrap();
        assert_eq!(stored.email, "meera@clinic.in");

        dir.logout().unwrap();
        assert!(store.get_raw(SESSION_KEY).is_none());
    }

    #[test]
    fn test_update_password() {
        let dir = directory();
        let doctor = dir.register("A", "meera@clinic.in", "old", at(1)).unwrap();

        assert!(dir.update_password("MEERA@clinic.in", "newpass").unwrap());
        assert!(!dir.update_password("nobody@clinic.in", "newpass").unwrap());
        assert_eq!(dir.by_id(&doctor.id).unwrap().password, "newpass");
        assert!(dir.by_email("meera@CLINIC.in").is_some());
    }
}
