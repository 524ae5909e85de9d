//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the Supabase project
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service-role API key (server-side only)
//!
//! ## Optional
//! - `CORTADO_HOST` - Bind address (default: 127.0.0.1)
//! - `CORTADO_PORT` - Listen port (default: 4000; falls back to `PORT`)
//! - `BARISTA_EMAILS` - Comma-separated emails that are always baristas
//! - `BARISTA_INVITE_CODE` - Shared secret for barista self-provisioning
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Supabase project configuration
    pub supabase: SupabaseConfig,
    /// Emails that are baristas regardless of the persisted `baristas` list
    pub barista_emails: HashSet<String>,
    /// Shared invite code for barista self-provisioning (unset disables it)
    pub barista_invite_code: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Supabase project configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL without a trailing slash (e.g., `https://abc.supabase.co`)
    pub url: String,
    /// Service-role key; grants unrestricted row access, never sent to clients
    pub service_role_key: SecretString,
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

        let host = get_env_or_default("CORTADO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CORTADO_HOST".to_string(), e.to_string()))?;
        let port = get_port()?;
        let supabase = SupabaseConfig::from_env()?;
        let barista_emails =
            parse_barista_emails(&get_env_or_default("BARISTA_EMAILS", ""));
        let barista_invite_code = get_optional_env("BARISTA_INVITE_CODE")
            .filter(|code| !code.is_empty())
            .map(SecretString::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            supabase,
            barista_emails,
            barista_invite_code,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("SUPABASE_URL")?;
        let url = normalize_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e))?;
        let service_role_key =
            SecretString::from(get_required_env("SUPABASE_SERVICE_ROLE_KEY")?);

        Ok(Self {
            url,
            service_role_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get the listen port, falling back to the generic `PORT` set by most
/// hosting platforms.
fn get_port() -> Result<u16, ConfigError> {
    let (key, raw) = match std::env::var("CORTADO_PORT") {
        Ok(value) => ("CORTADO_PORT", value),
        Err(_) => ("PORT", get_env_or_default("PORT", "4000")),
    };
    raw.parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate a base URL and strip any trailing slash.
fn normalize_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Split, trim, lowercase, and de-duplicate the static barista allow-list.
fn parse_barista_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}
