//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TOKRI_API_BASE_URL` - Base URL of the storefront backend API
//!
//! ## Optional
//! - `TOKRI_API_TOKEN` - Bearer token for the backend API
//! - `TOKRI_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `TOKRI_DATA_DIR` - Directory for durable cart storage
//!   (default: the platform data dir, e.g. `~/.local/share/tokri`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("No usable data directory; set TOKRI_DATA_DIR")]
    NoDataDir,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Directory holding the durable cart file
    pub data_dir: PathBuf,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the backend API (e.g. <https://api.example.pk>)
    pub base_url: Url,
    /// Bearer token sent with every request, when configured
    pub api_token: Option<SecretString>,
    /// Per-request timeout applied to every backend call
    pub http_timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API token fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let data_dir = match get_optional_env("TOKRI_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("tokri"),
        };

        Ok(Self { api, data_dir })
    }

    /// Path of the durable cart file inside the data directory.
    #[must_use]
    pub fn cart_file(&self) -> PathBuf {
        self.data_dir.join("cart.json")
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("TOKRI_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TOKRI_API_BASE_URL".to_string(), e.to_string())
        })?;

        let api_token = match get_optional_env("TOKRI_API_TOKEN") {
            Some(token) => {
                validate_secret_strength(&token, "TOKRI_API_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let timeout_secs = get_env_or_default(
            "TOKRI_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TOKRI_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            api_token,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Expose the configured token for an Authorization header.
    #[must_use]
    pub fn token_value(&self) -> Option<String> {
        self.api_token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
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

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
