//! Dashboard Routes
//!
//! - GET /api/v1/dashboard - Counts, today's appointments, pending total
//! - POST /api/v1/theme/toggle - Switch light/dark

use axum::{extract::State, Json};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::ThemeResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::dashboard::DashboardSummary;

/// GET /api/v1/dashboard
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSummary> {
    Json(state.dashboard.summary(Local::now().naive_local()))
}

/// POST /api/v1/theme/toggle
pub async fn toggle_theme(State(state): State<Arc<AppState>>) -> ApiResult<Json<ThemeResponse>> {
    let theme = state.dashboard.toggle_theme()?;
    Ok(Json(ThemeResponse {
        theme: theme.to_string(),
    }))
}
