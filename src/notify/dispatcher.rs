//! Notification dispatcher
//!
//! Builds the message, opens the native WhatsApp link and falls back to
//! the web link when the native one is refused or not handed off within
//! the fallback delay. Every attempt lands in the outbox.

use super::launcher::{BrowserLauncher, Launcher, LogLauncher};
use super::link::WhatsAppLink;
use super::message;
use super::outbox::{Channel, DeliveryStatus, MessageKind, OutboundMessage, Outbox};
use super::phone::normalize_phone;
use super::NotifyError;
use crate::config::{ClinicConfig, Config, LaunchMode, NotificationConfig, WebFallback};
use crate::records::{Appointment, Transaction};
use crate::store::LocalStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

pub struct NotificationDispatcher {
    launcher: Arc<dyn Launcher>,
    outbox: Outbox,
    clinic: ClinicConfig,
    web_fallback: WebFallback,
    fallback_delay: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        launcher: Arc<dyn Launcher>,
        store: LocalStore,
        clinic: ClinicConfig,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            launcher,
            outbox: Outbox::new(store, config.outbox_limit),
            clinic,
            web_fallback: config.web_fallback,
            fallback_delay: Duration::from_millis(config.fallback_delay_ms),
        }
    }

    /// Dispatcher with the launcher named in the config
    pub fn from_config(store: LocalStore, config: &Config) -> Self {
        let launcher: Arc<dyn Launcher> = match config.notifications.launch {
            LaunchMode::Browser => Arc::new(BrowserLauncher),
            LaunchMode::Log => Arc::new(LogLauncher),
        };
        Self::new(
            launcher,
            store,
            config.clinic.clone(),
            &config.notifications,
        )
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn clinic(&self) -> &ClinicConfig {
        &self.clinic
    }

    pub fn launcher_name(&self) -> &'static str {
        self.launcher.name()
    }

    /// Send the booking confirmation. Returns `None` without sending when
    /// the appointment has not opted in or has no phone number.
    pub async fn notify_appointment(
        &self,
        appointment: &Appointment,
    ) -> Result<Option<OutboundMessage>, NotifyError> {
        if !appointment.wants_notification() {
            tracing::debug!(appointment_id = %appointment.id, "No WhatsApp confirmation requested");
            return Ok(None);
        }

        let body = message::appointment_confirmation(appointment, &self.clinic);
        let recipient = if appointment.patient_name.is_empty() {
            "Patient".to_string()
        } else {
            appointment.patient_name.clone()
        };

        self.dispatch(
            MessageKind::AppointmentConfirmation,
            &appointment.id,
            recipient,
            &appointment.patient_phone,
            body,
            false,
        )
        .await
        .map(Some)
    }

    /// Payment reminder for a ledger entry. With no patient phone the
    /// message goes to the clinic's own number.
    pub async fn send_payment_reminder(
        &self,
        txn: &Transaction,
        automatic: bool,
    ) -> Result<OutboundMessage, NotifyError> {
        let body = message::payment_reminder(txn, &self.clinic);
        self.dispatch(
            MessageKind::PaymentReminder,
            &txn.id,
            txn.patient_name.clone(),
            &txn.patient_phone,
            body,
            automatic,
        )
        .await
    }

    pub async fn send_transaction_details(
        &self,
        txn: &Transaction,
    ) -> Result<OutboundMessage, NotifyError> {
        let body = message::transaction_details(txn, &self.clinic);
        self.dispatch(
            MessageKind::TransactionDetails,
            &txn.id,
            txn.patient_name.clone(),
            &txn.patient_phone,
            body,
            false,
        )
        .await
    }

    async fn dispatch(
        &self,
        kind: MessageKind,
        reference_id: &str,
        recipient: String,
        raw_phone: &str,
        body: String,
        automatic: bool,
    ) -> Result<OutboundMessage, NotifyError> {
        let phone = normalize_phone(raw_phone, &self.clinic.country_code, &self.clinic.phone);
        let link = WhatsAppLink::new(&phone, &body);

        let mut entry = OutboundMessage {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            reference_id: reference_id.to_string(),
            recipient,
            phone,
            body,
            native_link: link.native(),
            web_link: link.web(self.web_fallback),
            automatic,
            status: DeliveryStatus::Unknown,
            created_at: Utc::now(),
        };
        self.outbox.push(&entry)?;

        entry.status = self.hand_off(&entry).await;
        self.outbox.set_status(&entry.id, entry.status.clone())?;

        match &entry.status {
            DeliveryStatus::Sent { channel } => tracing::info!(
                message_id = %entry.id,
                kind = ?entry.kind,
                reference_id = %entry.reference_id,
                channel = ?channel,
                automatic,
                "WhatsApp message handed off"
            ),
            DeliveryStatus::Failed { reason } => tracing::warn!(
                message_id = %entry.id,
                kind = ?entry.kind,
                reference_id = %entry.reference_id,
                reason = %reason,
                "WhatsApp message could not be opened"
            ),
            DeliveryStatus::Unknown => {}
        }

        Ok(entry)
    }

    /// Native link first, web link if that is refused or times out
    async fn hand_off(&self, entry: &OutboundMessage) -> DeliveryStatus {
        match tokio::time::timeout(self.fallback_delay, self.launcher.open(&entry.native_link)).await
        {
            Ok(Ok(())) => {
                return DeliveryStatus::Sent {
                    channel: Channel::Native,
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(message_id = %entry.id, error = %e, "Native link refused, trying web");
            }
            Err(_) => {
                tracing::debug!(
                    message_id = %entry.id,
                    delay_ms = self.fallback_delay.as_millis() as u64,
                    "Native link not opened in time, trying web"
                );
            }
        }

        match self.launcher.open(&entry.web_link).await {
            Ok(()) => DeliveryStatus::Sent {
                channel: Channel::Web,
            },
            Err(e) => DeliveryStatus::Failed {
                reason: e.to_string(),
            },
        }
    }
}
