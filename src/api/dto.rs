//! Data Transfer Objects
//!
//! Request and response bodies that are not records themselves.

use crate::records::Doctor;
use serde::{Deserialize, Serialize};

// ============================================
// RECORD DTOs
// ============================================

/// `?q=` search and `?status=` filter for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

// ============================================
// NOTIFICATION DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct OutboxParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub theme: String,
}

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenCheckResponse {
    pub valid: bool,
    pub email: String,
}

/// A doctor without the password
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<Doctor> for DoctorResponse {
    fn from(d: Doctor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            role: d.role,
            created_at: d.created_at,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub storage: String,
    pub backend: String,
    pub launcher: String,
    pub reminders_enabled: bool,
    pub uptime_seconds: u64,
    pub version: String,
}
