//! Clinicdesk API Server
//!
//! Run with: cargo run --bin clinicdesk
//!
//! Reads `config.toml` from the usual locations (see [`Config::discover`]),
//! with `CLINICDESK_*` environment overrides. `RUST_LOG` wins over
//! `[logging] level` when set.

use anyhow::Context;
use clinicdesk::api::{serve, AppState};
use clinicdesk::config::{Config, LoggingConfig};
use clinicdesk::store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = Config::discover();
    init_tracing(&loaded.config.logging);

    tracing::info!("Starting Clinicdesk v{}", env!("CARGO_PKG_VERSION"));
    loaded.log_source();
    let config = loaded.config;
    tracing::info!(
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir,
        "Opening store"
    );

    let local_store = store::open(&config.storage).context("failed to open store")?;
    let state = AppState::new(local_store, config);

    tracing::info!(
        launcher = state.dispatcher.launcher_name(),
        clinic = %state.config.clinic.name,
        "Notification dispatcher ready"
    );

    let reminder_handle = state.reminders.clone().start();
    let reminders = state.reminders.clone();

    let result = serve(state).await;

    reminders.stop().await;
    reminder_handle.abort();

    result.context("API server failed")?;
    tracing::info!("Clinicdesk shutdown complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("clinicdesk={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
