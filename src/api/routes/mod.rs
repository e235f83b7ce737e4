//! API Routes
//!
//! Route handlers organized by functionality.

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod records;
pub mod reminders;
pub mod transactions;
