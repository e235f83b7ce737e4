//! Clinicdesk REST API
//!
//! JSON over HTTP, built with Axum. Records use the same camelCase shape
//! they are stored in.
//!
//! # Endpoints
//!
//! ## Records
//! - `GET|POST /api/v1/patients`, `GET|PUT|DELETE /api/v1/patients/:id`
//! - `GET|POST /api/v1/appointments`, `GET|PUT|DELETE /api/v1/appointments/:id`
//! - `GET|POST /api/v1/transactions`, `GET|PUT|DELETE /api/v1/transactions/:id`
//!
//! List endpoints take `?q=` (search) and `?status=` (filter).
//!
//! ## Notifications
//! - `POST /api/v1/appointments/:id/notify` - Appointment confirmation
//! - `DELETE /api/v1/appointments/:id/files/:index` - Drop an attachment
//! - `POST /api/v1/transactions/:id/remind` - Payment reminder
//! - `POST /api/v1/transactions/:id/details` - Transaction statement
//! - `GET /api/v1/transactions/export` - Ledger as CSV
//! - `POST /api/v1/reminders/run`, `GET /api/v1/reminders/status`, `PUT /api/v1/reminders`
//! - `GET /api/v1/outbox`
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard`
//! - `POST /api/v1/theme/toggle`
//!
//! ## Auth
//! - `POST /api/v1/auth/register|login|logout|forgot|reset`
//! - `GET /api/v1/auth/reset?token=`
//!
//! ## Health
//! - `GET /health/live`, `GET /health/ready`, `GET /health`

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::entity::{AppointmentForm, PatientForm, TransactionForm};
use crate::records::{Appointment, Patient, Transaction};
use routes::records;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.api.max_body_mb * 1024 * 1024;

    let api_routes = Router::new()
        // Patients
        .route(
            "/patients",
            get(records::list::<Patient>).post(records::create::<PatientForm>),
        )
        .route(
            "/patients/:id",
            get(records::get_one::<Patient>)
                .put(records::update::<PatientForm>)
                .delete(records::remove::<Patient>),
        )
        // Appointments
        .route(
            "/appointments",
            get(records::list::<Appointment>).post(routes::appointments::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(records::get_one::<Appointment>)
                .put(records::update::<AppointmentForm>)
                .delete(records::remove::<Appointment>),
        )
        .route(
            "/appointments/:id/notify",
            post(routes::appointments::notify_appointment),
        )
        .route(
            "/appointments/:id/files/:index",
            delete(routes::appointments::remove_file),
        )
        // Khatabook
        .route(
            "/transactions",
            get(records::list::<Transaction>).post(records::create::<TransactionForm>),
        )
        .route("/transactions/export", get(routes::transactions::export_csv))
        .route(
            "/transactions/:id",
            get(records::get_one::<Transaction>)
                .put(records::update::<TransactionForm>)
                .delete(records::remove::<Transaction>),
        )
        .route(
            "/transactions/:id/remind",
            post(routes::transactions::send_reminder),
        )
        .route(
            "/transactions/:id/details",
            post(routes::transactions::send_details),
        )
        // Reminders and outbox
        .route("/reminders/run", post(routes::reminders::run_reminders))
        .route("/reminders/status", get(routes::reminders::reminder_status))
        .route("/reminders", axum::routing::put(routes::reminders::set_reminders))
        .route("/outbox", get(routes::reminders::list_outbox))
        // Dashboard
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route("/theme/toggle", post(routes::dashboard::toggle_theme))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/forgot", post(routes::auth::forgot_password))
        .route(
            "/auth/reset",
            get(routes::auth::check_reset_token).post(routes::auth::reset_password),
        )
        // Attachments travel inline as data URIs
        .layer(DefaultBodyLimit::max(body_limit));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server and run until Ctrl+C or SIGTERM
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Clinicdesk API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Clinicdesk API shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
