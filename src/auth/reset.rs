//! Password reset tokens

use super::{DoctorDirectory, ResetError};
use crate::config::AuthConfig;
use crate::records::PasswordResetToken;
use crate::store::{LocalStore, StoreResult};
use chrono::{DateTime, Duration, Utc};

pub const RESETS_KEY: &str = "password_resets";

/// `reset_<millis>_<email without non-alphanumerics>`
pub fn generate_reset_token(email: &str, now: DateTime<Utc>) -> String {
    let cleaned: String = email.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("reset_{}_{}", now.timestamp_millis(), cleaned)
}

/// Outcome of a forgot-password request
#[derive(Debug, Clone)]
pub struct ResetRequest {
    /// Text shown to whoever asked
    pub message: String,
    /// The issued token, if the email belonged to a doctor
    pub token: Option<PasswordResetToken>,
}

pub struct PasswordResets {
    store: LocalStore,
    doctors: DoctorDirectory,
    ttl: Duration,
    link_base: String,
    min_password_len: usize,
}

impl PasswordResets {
    pub fn new(store: LocalStore, config: &AuthConfig) -> Self {
        Self {
            doctors: DoctorDirectory::new(store.clone()),
            store,
            ttl: Duration::hours(config.reset_token_ttl_hours),
            link_base: config.reset_link_base.clone(),
            min_password_len: config.min_password_len,
        }
    }

    pub fn tokens(&self) -> Vec<PasswordResetToken> {
        self.store.load(RESETS_KEY)
    }

    /// Issue a reset token if `email` belongs to a doctor. The email itself
    /// is simulated: the reset link goes to the log.
    pub fn request_reset(&self, email: &str, now: DateTime<Utc>) -> StoreResult<ResetRequest> {
        let email = email.trim();
        if self.doctors.by_email(email).is_none() {
            tracing::info!("Password reset requested for unknown email");
            return Ok(ResetRequest {
                message: format!(
                    "If an account with the email {} exists, a password reset link has been sent.",
                    email
                ),
                token: None,
            });
        }

        let issued = now.timestamp_millis();
        let token = PasswordResetToken {
            email: email.to_string(),
            token: generate_reset_token(email, now),
            timestamp: issued,
            expires_at: issued + self.ttl.num_milliseconds(),
        };

        let mut tokens = self.tokens();
        tokens.push(token.clone());
        self.store.save(RESETS_KEY, &tokens)?;

        tracing::info!(
            email = %email,
            link = %self.reset_link(&token.token),
            "Password reset email sent"
        );

        Ok(ResetRequest {
            message: format!(
                "Password reset link has been sent to {}. Check your email and follow the \
                 instructions. The reset link will expire in {} hours.",
                email,
                self.ttl.num_hours()
            ),
            token: Some(token),
        })
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}?token={}", self.link_base, urlencoding::encode(token))
    }

    /// The stored record for `token`, if it exists and has not expired
    pub fn validate(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PasswordResetToken, ResetError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ResetError::MissingToken)?;

        let record = self
            .tokens()
            .into_iter()
            .find(|r| r.token == token)
            .ok_or(ResetError::UnknownToken)?;

        if record.is_expired(now.timestamp_millis()) {
            return Err(ResetError::Expired);
        }
        Ok(record)
    }

    /// Set a new password and consume the token
    pub fn reset_password(
        &self,
        token: Option<&str>,
        password: &str,
        confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ResetError> {
        if password != confirm {
            return Err(ResetError::Mismatch);
        }
        if password.chars().count() < self.min_password_len {
            return Err(ResetError::TooShort(self.min_password_len));
        }

        let record = self.validate(token, now)?;

        if !self.doctors.update_password(&record.email, password)? {
            return Err(ResetError::UpdateFailed);
        }

        let remaining: Vec<PasswordResetToken> = self
            .tokens()
            .into_iter()
            .filter(|r| r.token != record.token)
            .collect();
        self.store.save(RESETS_KEY, &remaining)?;

        tracing::info!(email = %record.email, "Password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const T: i64 = 1_717_200_000_000;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn setup() -> (LocalStore, PasswordResets) {
        let store = LocalStore::in_memory();
        DoctorDirectory::new(store.clone())
            .register("Dr. Meera", "meera.shah@clinic.in", "oldpass", at(0))
            .unwrap();
        let resets = PasswordResets::new(store.clone(), &AuthConfig::default());
        (store, resets)
    }

    #[test]
    fn test_generate_reset_token() {
        assert_eq!(
            generate_reset_token("meera.shah@clinic.in", at(T)),
            "reset_1717200000000_meerashahclinicin"
        );
    }

    #[test]
    fn test_request_reset_known_and_unknown() {
        let (_store, resets) = setup();

        let known = resets.request_reset("meera.shah@clinic.in", at(T)).unwrap();
        let token = known.token.unwrap();
        assert_eq!(token.expires_at, T + 24 * 3_600_000);
        assert!(known.message.contains("will expire in 24 hours"));

        let unknown = resets.request_reset("nobody@clinic.in", at(T)).unwrap();
        assert!(unknown.token.is_none());
        assert_eq!(
            unknown.message,
            "If an account with the email nobody@clinic.in exists, a password reset link has been sent."
        );
        assert_eq!(resets.tokens().len(), 1);
    }

    #[test]
    fn test_validate_errors() {
        let (_store, resets) = setup();
        let token = resets
            .request_reset("meera.shah@clinic.in", at(T))
            .unwrap()
            .token
            .unwrap();

        assert_eq!(
            resets.validate(None, at(T)).unwrap_err().to_string(),
            "Invalid or missing reset token"
        );
        assert_eq!(
            resets.validate(Some("reset_1_x"), at(T)).unwrap_err().to_string(),
            "Invalid reset token"
        );
        assert!(resets.validate(Some(&token.token), at(T + 3_600_000)).is_ok());
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let (_store, resets) = setup();
        let token = resets
            .request_reset("meera.shah@clinic.in", at(T))
            .unwrap()
            .token
            .unwrap();

        let err = resets
            .validate(Some(&token.token), at(T + 25 * 3_600_000))
            .unwrap_err();
        assert!(matches!(err, ResetError::Expired));
        assert_eq!(
            err.to_string(),
            "Reset token has expired. Please request a new reset link."
        );
    }

    #[test]
    fn test_reset_password_single_use() {
        let (store, resets) = setup();
        let token = resets
            .request_reset("meera.shah@clinic.in", at(T))
            .unwrap()
            .token
            .unwrap();

        resets
            .reset_password(Some(&token.token), "newpass", "newpass", at(T + 1000))
            .unwrap();

        let dir = DoctorDirectory::new(store);
        assert!(dir.authenticate("meera.shah@clinic.in", "newpass").is_some());
        assert!(resets.tokens().is_empty());

        let again = resets
            .reset_password(Some(&token.token), "another", "another", at(T + 2000))
            .unwrap_err();
        assert!(matches!(again, ResetError::UnknownToken));
    }

    #[test]
    fn test_reset_password_input_checks() {
        let (_store, resets) = setup();
        let token = resets
            .request_reset("meera.shah@clinic.in", at(T))
            .unwrap()
            .token
            .unwrap();

        let err = resets
            .reset_password(Some(&token.token), "abcdef", "abcdeg", at(T))
            .unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");

        let err = resets
            .reset_password(Some(&token.token), "abc", "abc", at(T))
            .unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters long");

        let err = resets
            .reset_password(Some(&token.token), "abcdef", "abcdef", at(T + 25 * 3_600_000))
            .unwrap_err();
        assert!(matches!(err, ResetError::Expired));
        assert_eq!(resets.tokens().len(), 1);
    }

    #[test]
    fn test_reset_for_removed_doctor_fails() {
        let (store, resets) = setup();
        let token = resets
            .request_reset("meera.shah@clinic.in", at(T))
            .unwrap()
            .token
            .unwrap();
        store.save::<crate::records::Doctor>("doctors", &[]).unwrap();

        let err = resets
            .reset_password(Some(&token.token), "abcdef", "abcdef", at(T))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to reset password. Please try again.");
    }
}
