//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `SERVER_HOST` - Bind address (default: 127.0.0.1)
//! - `SERVER_PORT` - Listen port (default: 5001)
//! - `BASE_URL` - Public URL of the API (default: `http://localhost:<port>`)
//! - `CORS_ORIGIN` - Allowed browser origin (default: `http://localhost:3000`)
//! - `EXPIRY_SWEEP_SCHEDULE` - When to mark expired items (default: `daily@02:00`)
//! - `PURGE_SWEEP_SCHEDULE` - When to delete old expired items (default: `daily@03:00`)
//! - `PURGE_GRACE_DAYS` - Days an expired item stays visible (default: 3)
//! - `DEFAULT_ITEM_TTL_DAYS` - Expiry applied when a create request omits one (default: 30)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (0.0 to 1.0, default 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default 1.0)

use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

use crate::scheduler::SweepSchedule;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API (used to decide on secure cookies)
    pub base_url: String,
    /// Browser origin allowed by CORS
    pub cors_origin: String,
    /// Lifecycle scheduler configuration
    pub scheduler: SchedulerConfig,
    /// Expiry applied when a create request omits `expiryDate`
    pub default_item_ttl_days: i64,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Lifecycle scheduler configuration.
///
/// Both sweeps are expressed as absolute-time predicates, so these settings
/// only control *when* the sweeps run, never *what* they select.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// When the expiry sweep runs.
    pub expiry_schedule: SweepSchedule,
    /// When the purge sweep runs. Keep this after the expiry sweep so a
    /// freshly-expired batch is committed before purging is considered.
    pub purge_schedule: SweepSchedule,
    /// Days an expired item survives before the purge sweep deletes it,
    /// measured from `expiry_date`.
    pub purge_grace_days: i64,
}

impl SchedulerConfig {
    /// The grace period as a [`chrono::Duration`].
    #[must_use]
    pub fn purge_grace(&self) -> Duration {
        Duration::days(self.purge_grace_days)
    }

    fn from_env() -> Result<Self, ConfigError> {
        let expiry_schedule = get_env_or_default("EXPIRY_SWEEP_SCHEDULE", "daily@02:00")
            .parse::<SweepSchedule>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EXPIRY_SWEEP_SCHEDULE".to_owned(), e.to_string())
            })?;
        let purge_schedule = get_env_or_default("PURGE_SWEEP_SCHEDULE", "daily@03:00")
            .parse::<SweepSchedule>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PURGE_SWEEP_SCHEDULE".to_owned(), e.to_string())
            })?;
        let purge_grace_days = parse_positive_days("PURGE_GRACE_DAYS", "3")?;

        Ok(Self {
            expiry_schedule,
            purge_schedule,
            purge_grace_days,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("SERVER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("SERVER_PORT", "5001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_PORT".to_owned(), e.to_string()))?;
        let base_url = get_env_or_default("BASE_URL", &format!("http://localhost:{port}"));
        let cors_origin = get_env_or_default("CORS_ORIGIN", "http://localhost:3000");

        let scheduler = SchedulerConfig::from_env()?;
        let default_item_ttl_days = parse_positive_days("DEFAULT_ITEM_TTL_DAYS", "30")?;

        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origin,
            scheduler,
            default_item_ttl_days,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The default item TTL as a [`chrono::Duration`].
    #[must_use]
    pub fn default_item_ttl(&self) -> Duration {
        Duration::days(self.default_item_ttl_days)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a day-count variable that must be a positive integer.
fn parse_positive_days(key: &str, default: &str) -> Result<i64, ConfigError> {
    let days = get_env_or_default(key, default)
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if days <= 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("must be a positive number of days (got {days})"),
        ));
    }
    Ok(days)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scheduler::SweepSchedule;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/armory_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5001,
            base_url: "http://localhost:5001".to_owned(),
            cors_origin: "http://localhost:3000".to_owned(),
            scheduler: SchedulerConfig {
                expiry_schedule: SweepSchedule::Daily { hour: 2, min: 0 },
                purge_schedule: SweepSchedule::Daily { hour: 3, min: 0 },
                purge_grace_days: 3,
            },
            default_item_ttl_days: 30,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5001);
    }

    #[test]
    fn test_purge_grace_duration() {
        let config = test_config();
        assert_eq!(config.scheduler.purge_grace(), Duration::days(3));
    }

    #[test]
    fn test_default_item_ttl_duration() {
        let config = test_config();
        assert_eq!(config.default_item_ttl(), Duration::days(30));
    }

    #[test]
    fn test_parse_positive_days_rejects_zero_and_negative() {
        // The env var is unset, so the provided default is what gets parsed.
        assert!(parse_positive_days("ARMORY_TEST_UNSET_DAYS", "0").is_err());
        assert!(parse_positive_days("ARMORY_TEST_UNSET_DAYS", "-2").is_err());
        assert_eq!(parse_positive_days("ARMORY_TEST_UNSET_DAYS", "3").unwrap(), 3);
    }

    #[test]
    fn test_parse_positive_days_rejects_garbage() {
        let err = parse_positive_days("ARMORY_TEST_UNSET_DAYS", "three").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
