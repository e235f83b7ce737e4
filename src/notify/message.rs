//! Fixed message templates

use crate::config::ClinicConfig;
use crate::records::{parse_date, Appointment, PaymentStatus, Transaction};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%I:%M %p";

/// Appointment confirmation for the patient
pub fn appointment_confirmation(appointment: &Appointment, clinic: &ClinicConfig) -> String {
    let (date, time) = match appointment.scheduled_at() {
        Some(dt) => (
            dt.format(DATE_FORMAT).to_string(),
            dt.format(TIME_FORMAT).to_string(),
        ),
        None => (appointment.appointment_date.clone(), String::new()),
    };

    format!(
        "Dear Patient, your appointment for {} is scheduled on {} at {}. {}.",
        appointment.title, date, time, clinic.name
    )
}

/// Payment reminder for a pending or partially paid ledger entry
pub fn payment_reminder(txn: &Transaction, clinic: &ClinicConfig) -> String {
    let state = if txn.status == PaymentStatus::Partial {
        "partially paid and balance is"
    } else {
        "pending"
    };

    format!(
        "Dear {}, this is a reminder that your payment of ₹{} for dental treatment at {} is {}. \
         Payment was due on {}. Please make the payment at your earliest convenience. \
         For any queries, contact us at +{}.",
        txn.patient_name,
        txn.amount,
        clinic.name,
        state,
        display_date(txn.due_date.as_deref(), "as soon as possible"),
        clinic.phone
    )
}

/// Multi-line statement of one ledger entry
pub fn transaction_details(txn: &Transaction, clinic: &ClinicConfig) -> String {
    let mut lines = vec![
        format!("Dear {},", txn.patient_name),
        String::new(),
        format!("Here are your transaction details from {}:", clinic.name),
        String::new(),
        format!("Transaction Date: {}", display_date(Some(&txn.date), "")),
        format!("Amount: ₹{}", txn.amount),
        format!("Payment Type: {}", txn.payment_type),
        format!("Status: {}", txn.status.label()),
    ];

    if !txn.description.trim().is_empty() {
        lines.push(format!("Description: {}", txn.description.trim()));
    }

    lines.push(String::new());
    lines.push(format!("Thank you for choosing {}.", clinic.name));
    lines.push(format!(
        "For any queries, please contact us at +{}.",
        clinic.phone
    ));
    lines.join("\n")
}

/// `dd/mm/yyyy`, the raw text if it does not parse, `missing` if blank
fn display_date(raw: Option<&str>, missing: &str) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => missing.to_string(),
        Some(raw) => parse_date(raw)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(status: PaymentStatus, due: Option<&str>) -> Transaction {
        Transaction {
            id: "t1".into(),
            patient_name: "Ravi Kumar".into(),
            patient_phone: "9876543210".into(),
            date: "2024-06-01".into(),
            amount: "1200".into(),
            payment_type: "upi".into(),
            status,
            due_date: due.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_appointment_confirmation() {
        let appointment = Appointment {
            title: "Cleaning".into(),
            appointment_date: "2024-01-01T10:00".into(),
            ..Default::default()
        };
        let text = appointment_confirmation(&appointment, &ClinicConfig::default());
        assert_eq!(
            text,
            "Dear Patient, your appointment for Cleaning is scheduled on 01/01/2024 at 10:00 AM. \
             Dr. Asrani Dental Clinic."
        );
    }

    #[test]
    fn test_payment_reminder_pending() {
        let text = payment_reminder(&txn(PaymentStatus::Pending, Some("2024-06-10")), &ClinicConfig::default());
        assert!(text.starts_with("Dear Ravi Kumar, this is a reminder that your payment of ₹1200"));
        assert!(text.contains("at Dr. Asrani Dental Clinic is pending."));
        assert!(text.contains("Payment was due on 10/06/2024."));
        assert!(text.ends_with("contact us at +919767368738."));
    }

    #[test]
    fn test_payment_reminder_partial_without_due_date() {
        let text = payment_reminder(&txn(PaymentStatus::Partial, None), &ClinicConfig::default());
        assert!(text.contains("is partially paid and balance is."));
        assert!(text.contains("Payment was due on as soon as possible."));
    }

    #[test]
    fn test_transaction_details() {
        let mut entry = txn(PaymentStatus::Completed, None);
        let text = transaction_details(&entry, &ClinicConfig::default());
        assert!(text.contains("Transaction Date: 01/06/2024"));
        assert!(text.contains("Status: Paid"));
        assert!(!text.contains("Description:"));

        entry.description = "Root canal, second sitting".into();
        let text = transaction_details(&entry, &ClinicConfig::default());
        assert!(text.contains("Description: Root canal, second sitting"));
    }
}
