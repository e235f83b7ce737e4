//! Doctor accounts and password reset
//!
//! Credentials live in the `doctors` blob in plaintext and reset tokens
//! in `password_resets`. Nothing here is secure; it reproduces the
//! clinic's local login so existing stores keep working.

mod directory;
mod reset;

pub use directory::{DoctorDirectory, DOCTORS_KEY, SESSION_KEY};
pub use reset::{generate_reset_token, PasswordResets, ResetRequest, RESETS_KEY};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Doctor with this email already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reset failures, worded for the person resetting their password
#[derive(Error, Debug)]
pub enum ResetError {
    #[error("Invalid or missing reset token")]
    MissingToken,

    #[error("Invalid reset token")]
    UnknownToken,

    #[error("Reset token has expired. Please request a new reset link.")]
    Expired,

    #[error("Passwords do not match")]
    Mismatch,

    #[error("Password must be at least {0} characters long")]
    TooShort(usize),

    #[error("Failed to reset password. Please try again.")]
    UpdateFailed,

    #[error("An error occurred while resetting your password.")]
    Store(#[from] StoreError),
}
