//! Reminder and Outbox Routes
//!
//! - POST /api/v1/reminders/run - Scan for due payments now
//! - GET /api/v1/reminders/status - Scheduler state and last report
//! - PUT /api/v1/reminders - Turn automatic reminders on or off
//! - GET /api/v1/outbox?limit= - Recently handed-off messages, newest first

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ListResponse, OutboxParams, ReminderToggleRequest};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::notify::OutboundMessage;
use crate::reminders::{ReminderStatus, ScanReport};

const DEFAULT_OUTBOX_LIMIT: usize = 50;

/// POST /api/v1/reminders/run
///
/// Runs even when automatic reminders are off; daily markers still apply.
pub async fn run_reminders(State(state): State<Arc<AppState>>) -> ApiResult<Json<ScanReport>> {
    let report = state.reminders.run_now().await?;
    Ok(Json(report))
}

/// GET /api/v1/reminders/status
pub async fn reminder_status(State(state): State<Arc<AppState>>) -> Json<ReminderStatus> {
    Json(state.reminders.status().await)
}

/// PUT /api/v1/reminders
pub async fn set_reminders(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReminderToggleRequest>,
) -> Json<ReminderStatus> {
    state.reminders.set_enabled(req.enabled).await;
    Json(state.reminders.status().await)
}

/// GET /api/v1/outbox
pub async fn list_outbox(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OutboxParams>,
) -> Json<ListResponse<OutboundMessage>> {
    let limit = params.limit.unwrap_or(DEFAULT_OUTBOX_LIMIT);
    Json(ListResponse::new(state.dispatcher.outbox().recent(limit)))
}
