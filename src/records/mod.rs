//! Clinic records
//!
//! Flat, loosely-typed structs serialized with the camelCase keys the
//! clinic's stored blobs already use. Unknown keys on patients,
//! appointments and transactions are carried through untouched.

pub mod appointment;
pub mod doctor;
pub mod patient;
pub mod transaction;
pub mod types;

pub use appointment::Appointment;
pub use doctor::{Doctor, DoctorProfile, PasswordResetToken};
pub use patient::Patient;
pub use transaction::Transaction;
pub use types::{
    format_amount, parse_amount, parse_date, parse_datetime, AmountError, AppointmentStatus,
    Attachment, PaymentStatus,
};
