//! Record of every message handed off, stored under `outbox`

use crate::store::{LocalStore, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OUTBOX_KEY: &str = "outbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    AppointmentConfirmation,
    PaymentReminder,
    TransactionDetails,
}

/// Which link was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Native,
    Web,
}

/// Hand-off outcome. There is no delivery receipt, so `Sent` only means
/// a launcher accepted the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Queued, no verdict yet
    Unknown,
    Sent { channel: Channel },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub id: String,
    pub kind: MessageKind,
    /// Appointment or transaction the message is about
    pub reference_id: String,
    pub recipient: String,
    pub phone: String,
    pub body: String,
    pub native_link: String,
    pub web_link: String,
    #[serde(default)]
    pub automatic: bool,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl OutboundMessage {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, DeliveryStatus::Sent { .. })
    }
}

/// Bounded list of recent messages, oldest first
#[derive(Clone)]
pub struct Outbox {
    store: LocalStore,
    limit: usize,
}

impl Outbox {
    pub fn new(store: LocalStore, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
        }
    }

    pub fn list(&self) -> Vec<OutboundMessage> {
        self.store.load(OUTBOX_KEY)
    }

    /// Most recent first, at most `n`
    pub fn recent(&self, n: usize) -> Vec<OutboundMessage> {
        self.list().into_iter().rev().take(n).collect()
    }

    /// Append `message`, dropping the oldest entries past the limit
    pub fn push(&self, message: &OutboundMessage) -> StoreResult<()> {
        let mut messages = self.list();
        messages.push(message.clone());
        if messages.len() > self.limit {
            let excess = messages.len() - self.limit;
            messages.drain(..excess);
        }
        self.store.save(OUTBOX_KEY, &messages)
    }

    /// Set the status of the entry with `id`; false if it is gone
    pub fn set_status(&self, id: &str, status: DeliveryStatus) -> StoreResult<bool> {
        let mut messages = self.list();
        let Some(entry) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        entry.status = status;
        self.store.save(OUTBOX_KEY, &messages)?;
        Ok(true)
    }
}
