//! Khatabook ledger entries

use super::types::{lenient_string, parse_amount, parse_date, PaymentStatus};
use crate::entity::Entity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ledger entry for a patient
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub patient_id: String,
    /// Copied from the patient when the entry was made; may drift
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    /// Transaction date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// Parsed due date, `None` if unset or unreadable
    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_date)
    }

    /// Unpaid, due on or before `today`, and reachable by phone
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status != PaymentStatus::Completed
            && !self.patient_phone.trim().is_empty()
            && self.due_on().map(|due| due <= today).unwrap_or(false)
    }

    /// Amount as a number, `None` if the stored text is not numeric
    pub fn amount_value(&self) -> Option<f64> {
        parse_amount(&self.amount).ok()
    }
}

impl Entity for Transaction {
    const COLLECTION: &'static str = "transactions";
    const LABEL: &'static str = "Transaction";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn matches(&self, needle: &str) -> bool {
        self.patient_name.to_lowercase().contains(needle)
            || self.patient_id.to_lowercase().contains(needle)
            || self.patient_phone.contains(needle)
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pending(due: Option<&str>, phone: &str) -> Transaction {
        Transaction {
            id: "t1".into(),
            patient_name: "Ravi".into(),
            patient_phone: phone.into(),
            amount: "1200".into(),
            status: PaymentStatus::Pending,
            due_date: due.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_due() {
        let today = day(2024, 6, 10);
        assert!(pending(Some("2024-06-10"), "9876543210").is_due(today));
        assert!(pending(Some("2024-06-01"), "9876543210").is_due(today));
        assert!(!pending(Some("2024-06-11"), "9876543210").is_due(today));
        assert!(!pending(None, "9876543210").is_due(today));
        assert!(!pending(Some("2024-06-01"), "  ").is_due(today));
        assert!(!pending(Some("soon"), "9876543210").is_due(today));

        let mut paid = pending(Some("2024-06-01"), "9876543210");
        paid.status = PaymentStatus::Completed;
        assert!(!paid.is_due(today));

        let mut partial = pending(Some("2024-06-01"), "9876543210");
        partial.status = PaymentStatus::Partial;
        assert!(partial.is_due(today));
    }

    #[test]
    fn test_null_due_date() {
        let raw = r#"{"id":"t1","patientId":"p1","patientName":"Ravi","patientPhone":"",
            "date":"2024-06-01","amount":"300","paymentType":"Cash","description":"",
            "status":"partial","dueDate":null}"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(txn.due_date, None);
        assert_eq!(txn.status, PaymentStatus::Partial);
        assert_eq!(txn.amount_value(), Some(300.0));
    }

    #[test]
    fn test_search_matches_phone_exactly() {
        let txn = pending(None, "+91 98765 43210");
        assert!(txn.matches("98765"));
        assert!(txn.matches("ravi"));
        assert!(!txn.matches("sunita"));
    }
}
