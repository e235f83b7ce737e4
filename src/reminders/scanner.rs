//! Due-payment scan

use crate::notify::{NotificationDispatcher, NotifyError};
use crate::records::Transaction;
use crate::store::LocalStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Value written to a reminder marker key
pub const MARKER_VALUE: &str = "sent";

/// `reminder_<transaction id>_<YYYY-MM-DD>`
///
/// Ids that are not plain `[A-Za-z0-9_-]` text are written as `x<hex>` so
/// the key is valid for every backend.
pub fn marker_key(transaction_id: &str, day: NaiveDate) -> String {
    let plain = !transaction_id.is_empty()
        && transaction_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));

    let id = if plain {
        transaction_id.to_string()
    } else {
        let hex: String = transaction_id
            .bytes()
            .map(|b| format!("{:02x}", b))
            .collect();
        format!("x{}", hex)
    };
    format!("reminder_{}_{}", id, day.format("%Y-%m-%d"))
}

/// Day a marker key was written for, `None` for other keys
fn marker_day(key: &str) -> Option<NaiveDate> {
    let rest = key.strip_prefix("reminder_")?;
    let (_, day) = rest.rsplit_once('_')?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Tells clinic staff that something happened in the background
pub trait StaffNotifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Staff notifications as log lines
#[derive(Debug, Default)]
pub struct LogNotifier;

impl StaffNotifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        tracing::info!(title = %title, "{}", body);
    }
}

/// What one scan did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub date: Option<NaiveDate>,
    /// Transactions due on or before the scan date
    pub due: usize,
    /// Transaction ids reminded in this scan
    pub sent: Vec<String>,
    /// Already reminded today
    pub skipped: Vec<String>,
    /// Reminder not handed off, or its marker could not be stored
    pub failed: Vec<String>,
}

pub struct DuePaymentScanner {
    store: LocalStore,
    dispatcher: Arc<NotificationDispatcher>,
    notifier: Arc<dyn StaffNotifier>,
    staff_notifications: bool,
}

impl DuePaymentScanner {
    pub fn new(
        store: LocalStore,
        dispatcher: Arc<NotificationDispatcher>,
        notifier: Arc<dyn StaffNotifier>,
        staff_notifications: bool,
    ) -> Self {
        Self {
            store,
            dispatcher,
            notifier,
            staff_notifications,
        }
    }

    /// Remind every unpaid transaction due on or before `today`, at most
    /// once per transaction per day.
    ///
    /// The day's marker is claimed before the message goes out; a
    /// transaction whose marker cannot be stored is not reminded.
    pub async fn scan(&self, today: NaiveDate) -> Result<ScanReport, NotifyError> {
        self.prune_markers(today);

        let transactions: Vec<Transaction> = self.store.load("transactions");
        let mut report = ScanReport {
            date: Some(today),
            ..Default::default()
        };

        for txn in transactions.iter().filter(|t| t.is_due(today)) {
            report.due += 1;
            let key = marker_key(&txn.id, today);

            if self.store.get_raw(&key).is_some() {
                report.skipped.push(txn.id.clone());
                continue;
            }

            if let Err(e) = self.store.set_raw(&key, MARKER_VALUE) {
                tracing::warn!(transaction_id = %txn.id, error = %e, "Failed to record reminder marker, not sending");
                report.failed.push(txn.id.clone());
                continue;
            }

            let sent = self.dispatcher.send_payment_reminder(txn, true).await?;

            if !sent.is_sent() {
                report.failed.push(txn.id.clone());
                continue;
            }

            if self.staff_notifications {
                self.notifier.notify(
                    "Payment Reminder Sent",
                    &format!(
                        "Automatic reminder sent to {} for ₹{}",
                        txn.patient_name, txn.amount
                    ),
                );
            }
            report.sent.push(txn.id.clone());
        }

        tracing::info!(
            date = %today,
            due = report.due,
            sent = report.sent.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Due-payment scan finished"
        );
        Ok(report)
    }

    /// Drop markers for days before `today`; only today's are ever read.
    /// Returns how many were removed.
    pub fn prune_markers(&self, today: NaiveDate) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot list keys, reminder markers not pruned");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            if marker_day(&key).is_some_and(|day| day < today) {
                match self.store.remove(&key) {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!(key = %key, error = %e, "Failed to remove old reminder marker"),
                }
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "Pruned old reminder markers");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityList;
    use crate::notify::{test_dispatcher, RecordingLauncher};
    use crate::records::PaymentStatus;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingNotifier {
        seen: Mutex<Vec<(String, String)>>,
    }

    impl StaffNotifier for CollectingNotifier {
        fn notify(&self, title: &str, body: &str) {
            self.seen.lock().unwrap().push((title.into(), body.into()));
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed(store: &LocalStore) {
        let list: EntityList<Transaction> = EntityList::new(store.clone());
        let rows = [
            ("t1", "9876543210", "2024-06-10", PaymentStatus::Pending),
            ("t2", "9876543211", "2024-06-01", PaymentStatus::Partial),
            ("t3", "9876543212", "2024-06-10", PaymentStatus::Completed),
            ("t4", "9876543213", "2024-06-11", PaymentStatus::Pending),
            ("t5", "", "2024-06-10", PaymentStatus::Pending),
        ];
        for (id, phone, due, status) in rows {
            list.update(Transaction {
                id: id.into(),
                patient_name: format!("Patient {}", id),
                patient_phone: phone.into(),
                amount: "500".into(),
                status,
                due_date: Some(due.into()),
                ..Default::default()
            })
            .unwrap();
        }
    }

    fn scanner(
        store: &LocalStore,
        launcher: Arc<RecordingLauncher>,
        notifier: Arc<CollectingNotifier>,
    ) -> DuePaymentScanner {
        let dispatcher = Arc::new(test_dispatcher(launcher, store.clone()));
        DuePaymentScanner::new(store.clone(), dispatcher, notifier, true)
    }

    #[test]
    fn test_marker_key() {
        assert_eq!(marker_key("t1", day(2024, 6, 10)), "reminder_t1_2024-06-10");
        assert_eq!(
            marker_key("legacy 7", day(2024, 6, 10)),
            "reminder_x6c65676163792037_2024-06-10"
        );
        assert!(crate::store::validate_key(&marker_key("a/b:c", day(2024, 6, 10))).is_ok());
    }

    #[tokio::test]
    async fn test_old_markers_pruned() {
        let store = LocalStore::in_memory();
        seed(&store);
        store.set_raw("reminder_t1_2024-06-08", MARKER_VALUE).unwrap();
        store.set_raw("reminder_x6c65676163792037_2024-06-09", MARKER_VALUE).unwrap();
        store.set_raw("reminder_t9_2024-06-12", MARKER_VALUE).unwrap();
        store.set_raw("theme", "dark").unwrap();
        let scanner = scanner(
            &store,
            Arc::new(RecordingLauncher::default()),
            Arc::new(CollectingNotifier::default()),
        );

        let report = scanner.scan(day(2024, 6, 10)).await.unwrap();
        assert_eq!(report.sent, vec!["t1", "t2"]);

        let keys = store.keys().unwrap();
        assert!(!keys.iter().any(|k| k.ends_with("2024-06-08") || k.ends_with("2024-06-09")));
        assert!(keys.contains(&"reminder_t1_2024-06-10".to_string()));
        assert!(keys.contains(&"reminder_t9_2024-06-12".to_string()));
        assert!(keys.contains(&"theme".to_string()));

        assert_eq!(scanner.prune_markers(day(2024, 6, 10)), 0);
    }

    #[tokio::test]
    async fn test_unusual_id_reminded_once_per_day() {
        let store = LocalStore::in_memory();
        let list: EntityList<Transaction> = EntityList::new(store.clone());
        list.update(Transaction {
            id: "legacy 7".into(),
            patient_name: "Ravi".into(),
            patient_phone: "9876543210".into(),
            amount: "500".into(),
            due_date: Some("2024-06-10".into()),
            ..Default::default()
        })
        .unwrap();

        let launcher = Arc::new(RecordingLauncher::default());
        let scanner = scanner(&store, launcher.clone(), Arc::new(CollectingNotifier::default()));
        let today = day(2024, 6, 10);

        let first = scanner.scan(today).await.unwrap();
        assert_eq!(first.sent, vec!["legacy 7"]);
        for _ in 0..2 {
            let again = scanner.scan(today).await.unwrap();
            assert_eq!(again.skipped, vec!["legacy 7"]);
            assert!(again.failed.is_empty());
        }
        assert_eq!(launcher.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_unstorable_marker_sends_nothing() {
        let store = LocalStore::in_memory();
        let long_id = "t".repeat(300);
        let list: EntityList<Transaction> = EntityList::new(store.clone());
        list.update(Transaction {
            id: long_id.clone(),
            patient_name: "Ravi".into(),
            patient_phone: "9876543210".into(),
            amount: "500".into(),
            due_date: Some("2024-06-10".into()),
            ..Default::default()
        })
        .unwrap();

        let launcher = Arc::new(RecordingLauncher::default());
        let scanner = scanner(&store, launcher.clone(), Arc::new(CollectingNotifier::default()));

        for _ in 0..3 {
            let report = scanner.scan(day(2024, 6, 10)).await.unwrap();
            assert_eq!(report.failed, vec![long_id.clone()]);
        }
        assert!(launcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_one_reminder_per_day() {
        let store = LocalStore::in_memory();
        seed(&store);
        let launcher = Arc::new(RecordingLauncher::default());
        let notifier = Arc::new(CollectingNotifier::default());
        let scanner = scanner(&store, launcher.clone(), notifier.clone());
        let today = day(2024, 6, 10);

        let first = scanner.scan(today).await.unwrap();
        assert_eq!(first.due, 2);
        assert_eq!(first.sent, vec!["t1", "t2"]);

        for _ in 0..3 {
            let again = scanner.scan(today).await.unwrap();
            assert!(again.sent.is_empty());
            assert_eq!(again.skipped, vec!["t1", "t2"]);
        }

        assert_eq!(launcher.urls().len(), 2);
        assert_eq!(store.get_raw("reminder_t1_2024-06-10").as_deref(), Some("sent"));

        let next_day = scanner.scan(day(2024, 6, 11)).await.unwrap();
        assert_eq!(next_day.sent, vec!["t1", "t2", "t4"]);
    }

    #[tokio::test]
    async fn test_staff_notification_text() {
        let store = LocalStore::in_memory();
        seed(&store);
        let notifier = Arc::new(CollectingNotifier::default());
        let scanner = scanner(&store, Arc::new(RecordingLauncher::default()), notifier.clone());

        scanner.scan(day(2024, 6, 10)).await.unwrap();
        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "Payment Reminder Sent");
        assert_eq!(seen[0].1, "Automatic reminder sent to Patient t1 for ₹500");
    }

    #[tokio::test]
    async fn test_staff_notifications_can_be_off() {
        let store = LocalStore::in_memory();
        seed(&store);
        let notifier = Arc::new(CollectingNotifier::default());
        let dispatcher = Arc::new(test_dispatcher(
            Arc::new(RecordingLauncher::default()),
            store.clone(),
        ));
        let scanner = DuePaymentScanner::new(store.clone(), dispatcher, notifier.clone(), false);

        let report = scanner.scan(day(2024, 6, 10)).await.unwrap();
        assert_eq!(report.sent.len(), 2);
        assert!(notifier.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_handoff_is_reported_and_marked() {
        let store = LocalStore::in_memory();
        seed(&store);
        let launcher = Arc::new(RecordingLauncher {
            refuse_all: true,
            ..Default::default()
        });
        let notifier = Arc::new(CollectingNotifier::default());
        let scanner = scanner(&store, launcher, notifier.clone());

        let report = scanner.scan(day(2024, 6, 10)).await.unwrap();
        assert_eq!(report.failed, vec!["t1", "t2"]);
        assert!(notifier.seen.lock().unwrap().is_empty());
        assert!(store.get_raw("reminder_t1_2024-06-10").is_some());
    }
}
