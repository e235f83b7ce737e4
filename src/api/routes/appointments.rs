//! Appointment Routes
//!
//! - POST /api/v1/appointments - Create, then send the WhatsApp confirmation if requested
//! - POST /api/v1/appointments/:id/notify - Send the confirmation again
//! - DELETE /api/v1/appointments/:id/files/:index - Remove one attachment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::records::{create_record, find};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::entity::AppointmentForm;
use crate::notify::OutboundMessage;
use crate::records::Appointment;

/// POST /api/v1/appointments
///
/// A failed confirmation does not undo the booking.
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AppointmentForm>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let appointment = create_record(&state, form)?;

    if let Err(e) = state.dispatcher.notify_appointment(&appointment).await {
        tracing::warn!(appointment_id = %appointment.id, error = %e, "Confirmation not sent");
    }

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// POST /api/v1/appointments/:id/notify
pub async fn notify_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OutboundMessage>> {
    let appointment: Appointment = find(&state, &id)?;

    state
        .dispatcher
        .notify_appointment(&appointment)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::Validation(
                "Appointment has no WhatsApp opt-in or no patient phone".to_string(),
            )
        })
}

/// DELETE /api/v1/appointments/:id/files/:index
pub async fn remove_file(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(String, usize)>,
) -> ApiResult<Json<Appointment>> {
    let mut appointment: Appointment = find(&state, &id)?;

    if !appointment.remove_file(index) {
        return Err(ApiError::NotFound(format!(
            "Appointment {} has no attachment {}",
            id, index
        )));
    }

    let saved = state.list::<Appointment>().update(appointment)?;
    Ok(Json(saved))
}
