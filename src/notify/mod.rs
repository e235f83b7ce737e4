//! WhatsApp notifications
//!
//! There is no messaging API here. A message becomes a `whatsapp://` deep
//! link (with a web fallback) handed to a [`Launcher`]; whoever is at the
//! keyboard presses send. The [`Outbox`] keeps what was handed off.

mod dispatcher;
mod launcher;
mod link;
pub mod message;
mod outbox;
mod phone;

pub use dispatcher::NotificationDispatcher;
pub use launcher::{BrowserLauncher, Launcher, LogLauncher};
pub use link::WhatsAppLink;
pub use outbox::{Channel, DeliveryStatus, MessageKind, OutboundMessage, Outbox, OUTBOX_KEY};
pub use phone::normalize_phone;

#[cfg(test)]
pub(crate) use dispatcher::tests::{dispatcher as test_dispatcher, RecordingLauncher};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Launch failed: {0}")]
    Launch(String),

    #[error("Outbox error: {0}")]
    Outbox(#[from] StoreError),
}
