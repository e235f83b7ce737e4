//! Auth Routes
//!
//! - POST /api/v1/auth/register
//! - POST /api/v1/auth/login
//! - POST /api/v1/auth/logout
//! - POST /api/v1/auth/forgot - Issue a reset token (link goes to the log)
//! - GET /api/v1/auth/reset?token= - Check a reset token
//! - POST /api/v1/auth/reset - Set a new password

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{
    DoctorResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    ResetPasswordRequest, ResetQuery, TokenCheckResponse,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::records::DoctorProfile;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<DoctorResponse>)> {
    let doctor = state
        .doctors
        .register(&req.name, &req.email, &req.password, Utc::now())?;
    Ok((StatusCode::CREATED, Json(doctor.into())))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<DoctorProfile>> {
    let profile = state.doctors.login(&req.email, &req.password)?;
    Ok(Json(profile))
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.doctors.logout()?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/forgot
///
/// Same response shape whether or not the email is known.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let outcome = state.resets.request_reset(&req.email, Utc::now())?;
    Ok(Json(MessageResponse::new(outcome.message)))
}

/// GET /api/v1/auth/reset?token=
pub async fn check_reset_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResetQuery>,
) -> ApiResult<Json<TokenCheckResponse>> {
    let record = state.resets.validate(query.token.as_deref(), Utc::now())?;
    Ok(Json(TokenCheckResponse {
        valid: true,
        email: record.email,
    }))
}

/// POST /api/v1/auth/reset
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.resets.reset_password(
        req.token.as_deref(),
        &req.password,
        &req.confirm_password,
        Utc::now(),
    )?;
    Ok(Json(MessageResponse::new("Password successfully reset!")))
}
