//! Application State
//!
//! Shared state handed to every handler behind an `Arc`.

use crate::auth::{DoctorDirectory, PasswordResets};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::entity::{Entity, EntityList};
use crate::notify::NotificationDispatcher;
use crate::reminders::{DuePaymentScanner, LogNotifier, ReminderScheduler};
use crate::store::LocalStore;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Not started here; the server binary starts it
    pub reminders: Arc<ReminderScheduler>,
    pub doctors: DoctorDirectory,
    pub resets: Arc<PasswordResets>,
    pub dashboard: Dashboard,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

impl AppState {
    /// State with the launcher chosen by `config.notifications.launch`
    pub fn new(store: LocalStore, config: Config) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::from_config(store.clone(), &config));
        Self::with_dispatcher(store, config, dispatcher)
    }

    pub fn with_dispatcher(
        store: LocalStore,
        config: Config,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        let scanner = Arc::new(DuePaymentScanner::new(
            store.clone(),
            Arc::clone(&dispatcher),
            Arc::new(LogNotifier),
            config.reminders.staff_notifications,
        ));
        let reminders = Arc::new(ReminderScheduler::new(
            scanner,
            config.reminders.interval_hours,
            config.reminders.enabled,
        ));

        Self {
            doctors: DoctorDirectory::new(store.clone()),
            resets: Arc::new(PasswordResets::new(store.clone(), &config.auth)),
            dashboard: Dashboard::new(store.clone(), config.clinic.clone()),
            store,
            dispatcher,
            reminders,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Typed list over one collection
    pub fn list<E: Entity>(&self) -> EntityList<E> {
        EntityList::new(self.store.clone())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
