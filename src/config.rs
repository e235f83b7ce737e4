//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub clinic: ClinicConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub reminders: ReminderConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which key-value backend holds the clinic blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("clinicdesk").to_string_lossy().to_string())
        .unwrap_or_else(|| "./clinicdesk_data".to_string())
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_mb")]
    pub max_body_mb: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_max_body_mb() -> usize {
    25
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_mb: default_max_body_mb(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Clinic identity used in messages and on the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicConfig {
    #[serde(default = "default_clinic_name")]
    pub name: String,

    /// Full international number, digits only; also the fallback recipient
    #[serde(default = "default_clinic_phone")]
    pub phone: String,

    /// Prepended to bare 10-digit local numbers
    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(default = "default_doctor_name")]
    pub doctor_name: String,

    #[serde(default = "default_doctor_role")]
    pub doctor_role: String,

    #[serde(default)]
    pub doctor_email: String,
}

fn default_clinic_name() -> String {
    "Dr. Asrani Dental Clinic".to_string()
}

fn default_clinic_phone() -> String {
    "919767368738".to_string()
}

fn default_country_code() -> String {
    "91".to_string()
}

fn default_doctor_name() -> String {
    "Dr. Asrani".to_string()
}

fn default_doctor_role() -> String {
    "Dentist".to_string()
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
            phone: default_clinic_phone(),
            country_code: default_country_code(),
            doctor_name: default_doctor_name(),
            doctor_role: default_doctor_role(),
            doctor_email: String::new(),
        }
    }
}

/// How a link gets opened on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Hand links to the system URL handler
    Browser,
    /// Only log the links (headless deployments)
    Log,
}

/// Which web URL to use when the native scheme does not open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebFallback {
    /// https://api.whatsapp.com/send?phone=..&text=..
    ApiWhatsapp,
    /// https://wa.me/<phone>?text=..
    WaMe,
}

/// Notification dispatcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_launch_mode")]
    pub launch: LaunchMode,

    #[serde(default = "default_web_fallback")]
    pub web_fallback: WebFallback,

    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u64,

    #[serde(default = "default_outbox_limit")]
    pub outbox_limit: usize,
}

fn default_launch_mode() -> LaunchMode {
    LaunchMode::Log
}

fn default_web_fallback() -> WebFallback {
    WebFallback::ApiWhatsapp
}

fn default_fallback_delay() -> u64 {
    1000
}

fn default_outbox_limit() -> usize {
    500
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            launch: default_launch_mode(),
            web_fallback: default_web_fallback(),
            fallback_delay_ms: default_fallback_delay(),
            outbox_limit: default_outbox_limit(),
        }
    }
}

/// Due-payment reminder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_reminders_enabled")]
    pub enabled: bool,

    #[serde(default = "default_reminder_interval")]
    pub interval_hours: u64,

    /// Raise a staff notification for each automatic reminder
    #[serde(default = "default_staff_notifications")]
    pub staff_notifications: bool,
}

fn default_reminders_enabled() -> bool {
    true
}

fn default_reminder_interval() -> u64 {
    24
}

fn default_staff_notifications() -> bool {
    true
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: default_reminders_enabled(),
            interval_hours: default_reminder_interval(),
            staff_notifications: default_staff_notifications(),
        }
    }
}

/// Doctor login and password reset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_ttl")]
    pub reset_token_ttl_hours: i64,

    #[serde(default = "default_reset_link_base")]
    pub reset_link_base: String,

    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_token_ttl() -> i64 {
    24
}

fn default_reset_link_base() -> String {
    "http://localhost:3002/reset-password".to_string()
}

fn default_min_password_len() -> usize {
    6
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            reset_token_ttl_hours: default_token_ttl(),
            reset_link_base: default_reset_link_base(),
            min_password_len: default_min_password_len(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let loaded = Self::discover();
        loaded.log_source();
        loaded.config
    }

    /// Like [`Config::load_default`], but leaves reporting to the caller so
    /// it can happen after logging is set up
    pub fn discover() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("clinicdesk").join("config.toml")),
            Some(PathBuf::from("/etc/clinicdesk/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::discover_in(&config_paths)
    }

    /// First candidate that loads wins; falls back to defaults
    pub fn discover_in(config_paths: &[PathBuf]) -> LoadedConfig {
        let mut rejected = Vec::new();

        for path in config_paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        return LoadedConfig {
                            config,
                            path: Some(path.clone()),
                            rejected,
                        }
                    }
                    Err(e) => rejected.push(e),
                }
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            path: None,
            rejected,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(backend) = var("CLINICDESK_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!("Ignoring CLINICDESK_STORAGE_BACKEND: {}", e),
            }
        }
        if let Some(data_dir) = var("CLINICDESK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = var("CLINICDESK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("CLINICDESK_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Clinic overrides
        if let Some(name) = var("CLINICDESK_CLINIC_NAME") {
            self.clinic.name = name;
        }
        if let Some(phone) = var("CLINICDESK_CLINIC_PHONE") {
            self.clinic.phone = phone;
        }

        // Reminder overrides
        if let Some(enabled) = var("CLINICDESK_REMINDERS_ENABLED") {
            if let Ok(e) = enabled.parse() {
                self.reminders.enabled = e;
            }
        }

        // Logging overrides
        if let Some(level) = var("CLINICDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CLINICDESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// A config plus where it was found
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when built-in defaults were used
    pub path: Option<PathBuf>,
    /// Candidate files that exist but failed to load
    pub rejected: Vec<ConfigError>,
}

impl LoadedConfig {
    pub fn log_source(&self) {
        for e in &self.rejected {
            tracing::warn!("Skipping config: {}", e);
        }
        match &self.path {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Clinicdesk Configuration
#
# Environment variables override these settings:
# - CLINICDESK_STORAGE_BACKEND
# - CLINICDESK_DATA_DIR
# - CLINICDESK_API_HOST
# - CLINICDESK_API_PORT
# - CLINICDESK_CLINIC_NAME
# - CLINICDESK_CLINIC_PHONE
# - CLINICDESK_REMINDERS_ENABLED
# - CLINICDESK_LOG_LEVEL
# - CLINICDESK_LOG_FORMAT

[storage]
# Backend: file (one JSON file per key), sqlite, or memory
backend = "file"

# Directory for the store
data_dir = "~/.local/share/clinicdesk"

[api]
host = "127.0.0.1"
port = 8085

# Request body limit, attachments travel inline (MB)
max_body_mb = 25

[clinic]
name = "Dr. Asrani Dental Clinic"

# Digits only, with country code; used when a patient has no number
phone = "919767368738"
country_code = "91"

doctor_name = "Dr. Asrani"
doctor_role = "Dentist"
doctor_email = ""

[notifications]
# browser: open links with the system handler; log: only log them
launch = "log"

# api_whatsapp or wa_me
web_fallback = "api_whatsapp"

# How long the native whatsapp:// link gets before the web link is opened
fallback_delay_ms = 1000

# Entries kept in the outbox
outbox_limit = 500

[reminders]
enabled = true
interval_hours = 24
staff_notifications = true

[auth]
reset_token_ttl_hours = 24
reset_link_base = "http://localhost:3002/reset-password"
min_password_len = 6

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
