//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (store answers)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Liveness probe. Returns 200 if the process is alive, no store access.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Readiness probe. Returns 200 once the store answers, 503 otherwise.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_store(&state) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full status: store, backend, launcher, reminder toggle and uptime.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_ok = check_store(&state);

    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" }.to_string(),
        storage: if store_ok { "ok" } else { "error" }.to_string(),
        backend: state.store.backend_name().to_string(),
        launcher: state.dispatcher.launcher_name().to_string(),
        reminders_enabled: state.reminders.is_enabled().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Listing keys touches the backend without reading any blob
fn check_store(state: &AppState) -> bool {
    match state.store.keys() {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    }
}
