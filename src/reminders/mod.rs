//! Automatic due-payment reminders
//!
//! The scanner walks the ledger and sends one WhatsApp reminder per unpaid,
//! due transaction per calendar day, remembered with a
//! `reminder_<id>_<date>` marker in the store. The scheduler repeats the
//! scan on an interval.

mod scanner;
mod scheduler;

pub use scanner::{marker_key, DuePaymentScanner, LogNotifier, ScanReport, StaffNotifier, MARKER_VALUE};
pub use scheduler::{ReminderScheduler, ReminderStatus};
