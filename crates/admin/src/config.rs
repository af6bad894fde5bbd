//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin API
//! - `STORE_WHATSAPP_NUMBER` - Number that receives new orders
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_ALLOWED_ORIGINS` - Comma-separated CORS origins
//! - `ORDER_TRANSITION_POLICY` - `permissive` or `strict` (default: permissive)
//! - `STORE_NAME` - Shown in customer messages (default: Delivery)
//! - `FRONTEND_URL` - Base for tracking links in messages
//! - `STORE_UTC_OFFSET_HOURS` - Store local time, also used for "today" on the dashboard (default: -3)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::FixedOffset;
use delivery_core::ledger::TransitionPolicy;
use delivery_core::notify::WhatsAppNotifier;
use secrecy::SecretString;
use thiserror::Error;

/// Fewest digits a WhatsApp number can have (area code plus subscriber).
const MIN_WHATSAPP_DIGITS: usize = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,
    /// Which status changes the ledger accepts
    pub transition_policy: TransitionPolicy,
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Store identity and locale.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub name: String,
    pub whatsapp_number: String,
    pub frontend_url: Option<String>,
    pub utc_offset: FixedOffset,
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let whatsapp_number = get_required_env("STORE_WHATSAPP_NUMBER")?;
        validate_whatsapp_number(&whatsapp_number, "STORE_WHATSAPP_NUMBER")?;

        let frontend_url = get_optional_env("FRONTEND_URL");
        if let Some(url) = &frontend_url {
            validate_url(url, "FRONTEND_URL")?;
        }

        Ok(Self {
            name: get_env_or_default("STORE_NAME", "Delivery"),
            whatsapp_number,
            frontend_url,
            utc_offset: parse_utc_offset(&get_env_or_default("STORE_UTC_OFFSET_HOURS", "-3"))?,
        })
    }

    #[must_use]
    pub fn notifier(&self) -> WhatsAppNotifier {
        WhatsAppNotifier::new(
            &self.whatsapp_number,
            self.name.clone(),
            self.frontend_url.clone(),
            self.utc_offset,
        )
    }
}

impl AdminConfig {
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

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = parse_env("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env("ADMIN_PORT", "3001")?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        validate_url(&base_url, "ADMIN_BASE_URL")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            allowed_origins: parse_origins(&get_env_or_default("ADMIN_ALLOWED_ORIGINS", "")),
            transition_policy: parse_env("ORDER_TRANSITION_POLICY", "permissive")?,
            store: StoreConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |reason: &str| {
        ConfigError::InvalidEnvVar("STORE_UTC_OFFSET_HOURS".to_string(), reason.to_string())
    };

    let hours: i32 = value.trim().parse().map_err(|_| invalid("must be a whole number of hours"))?;
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| invalid("must be between -23 and 23"))
}

fn validate_whatsapp_number(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_WHATSAPP_DIGITS {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must contain at least {MIN_WHATSAPP_DIGITS} digits (got {digits})"),
        ));
    }
    Ok(())
}

fn validate_url(value: &str, var_name: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_policy_from_env_value() {
        assert_eq!("strict".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Strict);
        assert_eq!(" Permissive ".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Permissive);
        assert!("lenient".parse::<TransitionPolicy>().is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("-3").unwrap().local_minus_utc(), -3 * 3600);
        assert!(parse_utc_offset("abc").is_err());
    }

    #[test]
    fn test_validate_whatsapp_number() {
        assert!(validate_whatsapp_number("31 3333-4444", "TEST_VAR").is_ok());
        assert!(validate_whatsapp_number("123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "0.0.0.0".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            allowed_origins: parse_origins("http://localhost:5174"),
            transition_policy: TransitionPolicy::Strict,
            store: StoreConfig {
                name: "Delivery".to_string(),
                whatsapp_number: "3133334444".to_string(),
                frontend_url: None,
                utc_offset: FixedOffset::west_opt(3 * 3600).unwrap(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 3001);
        assert_eq!(config.allowed_origins, vec!["http://localhost:5174"]);
    }
}
