//! Reminder Scheduler
//!
//! Runs the due-payment scan once at start and then on a fixed interval.

use super::scanner::{DuePaymentScanner, ScanReport};
use crate::notify::NotifyError;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshot of the scheduler for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    pub enabled: bool,
    pub running: bool,
    pub interval_hours: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub last_report: Option<ScanReport>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct RunState {
    last_run: Option<DateTime<Utc>>,
    last_report: Option<ScanReport>,
    last_error: Option<String>,
}

pub struct ReminderScheduler {
    scanner: Arc<DuePaymentScanner>,
    interval_hours: u64,
    enabled: Arc<RwLock<bool>>,
    running: Arc<RwLock<bool>>,
    state: Arc<RwLock<RunState>>,
}

impl ReminderScheduler {
    pub fn new(scanner: Arc<DuePaymentScanner>, interval_hours: u64, enabled: bool) -> Self {
        Self {
            scanner,
            interval_hours: interval_hours.max(1),
            enabled: Arc::new(RwLock::new(enabled)),
            running: Arc::new(RwLock::new(false)),
            state: Arc::new(RwLock::new(RunState::default())),
        }
    }

    /// Start the background task. The first scan happens immediately.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            *scheduler.running.write().await = true;
            tracing::info!(interval_hours = scheduler.interval_hours, "Reminder scheduler started");

            let period = std::time::Duration::from_secs(scheduler.interval_hours * 3600);
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;

                if !*scheduler.running.read().await {
                    break;
                }

                if !*scheduler.enabled.read().await {
                    tracing::debug!("Automatic reminders disabled, skipping scan");
                    continue;
                }

                if let Err(e) = scheduler.run_now().await {
                    tracing::error!(error = %e, "Scheduled reminder scan failed");
                }
            }

            tracing::info!("Reminder scheduler stopped");
        })
    }

    /// Stop after the current tick
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// The "Auto WhatsApp Reminders" toggle
    pub async fn set_enabled(&self, enabled: bool) {
        *self.enabled.write().await = enabled;
        tracing::info!(enabled, "Automatic reminders toggled");
    }

    pub async fn is_enabled(&self) -> bool {
        *self.enabled.read().await
    }

    /// Scan for today's date, regardless of the toggle
    pub async fn run_now(&self) -> Result<ScanReport, NotifyError> {
        self.run_for(Local::now().date_naive()).await
    }

    pub async fn run_for(&self, today: NaiveDate) -> Result<ScanReport, NotifyError> {
        let result = self.scanner.scan(today).await;

        let mut state = self.state.write().await;
        state.last_run = Some(Utc::now());
        match &result {
            Ok(report) => {
                state.last_report = Some(report.clone());
                state.last_error = None;
            }
            Err(e) => state.last_error = Some(e.to_string()),
        }

        result
    }

    pub async fn status(&self) -> ReminderStatus {
        let state = self.state.read().await;
        let enabled = *self.enabled.read().await;
        let running = *self.running.read().await;

        ReminderStatus {
            enabled,
            running,
            interval_hours: self.interval_hours,
            last_run: state.last_run,
            next_run: match (running && enabled, state.last_run) {
                (true, Some(last)) => Some(last + Duration::hours(self.interval_hours as i64)),
                _ => None,
            },
            last_report: state.last_report.clone(),
            last_error: state.last_error.clone(),
        }
    }
}
