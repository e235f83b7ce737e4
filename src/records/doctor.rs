//! Doctor accounts and password reset tokens

use serde::{Deserialize, Serialize};

/// A doctor who can sign in
///
/// The password is stored and compared in plaintext.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub created_at: String,
}

impl Doctor {
    pub fn profile(&self) -> DoctorProfile {
        DoctorProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            profile_pic: None,
        }
    }
}

/// The signed-in doctor shown on the dashboard, stored under `doctor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl DoctorProfile {
    /// First name for greetings, skipping a leading "Dr."
    pub fn first_name(&self) -> &str {
        self.name
            .split_whitespace()
            .find(|part| !part.eq_ignore_ascii_case("dr.") && !part.eq_ignore_ascii_case("dr"))
            .unwrap_or(self.name.as_str())
    }
}

/// An issued password reset, stored in `password_resets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetToken {
    pub email: String,
    pub token: String,
    /// Issue time, ms since epoch
    pub timestamp: i64,
    /// Expiry, ms since epoch
    pub expires_at: i64,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}
