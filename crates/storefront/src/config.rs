//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NISSAHUB_API_BASE_URL` - Base URL of the marketplace web app (discussion,
//!   review, session, and order endpoints)
//!
//! ## Optional
//! - `NISSAHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `NISSAHUB_PORT` - Listen port (default: 3000)
//! - `NISSAHUB_DATA_DIR` - Directory holding the persisted cart slot (default: .nissahub)
//! - `NISSAHUB_CART_KEY` - Slot key of the persisted cart (default: `nissahub_cart`)
//! - `NISSAHUB_CHECKOUT_URL` - Order submission endpoint (default: `<api base>/checkout`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::store::DEFAULT_CART_KEY;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Persisted cart location
    pub cart: CartConfig,
    /// Marketplace API endpoints
    pub api: ApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where the persisted cart lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory of the file-backed slot
    pub data_dir: PathBuf,
    /// Slot key
    pub key: String,
}

/// Marketplace API endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the marketplace web app
    pub base_url: Url,
    /// Order submission endpoint receiving the `cart_data` form field
    pub checkout_url: Url,
}

impl StorefrontConfig {
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

        let host = get_env_or_default("NISSAHUB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("NISSAHUB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("NISSAHUB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("NISSAHUB_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            cart: CartConfig::from_env()?,
            api: ApiConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CartConfig {
    /// Load the cart slot location from the environment.
    ///
    /// Does not read `.env`; callers load it first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the slot key is not made of
    /// `[A-Za-z0-9_-]`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = get_env_or_default("NISSAHUB_CART_KEY", DEFAULT_CART_KEY);
        crate::store::validate_key(&key)
            .map_err(|e| ConfigError::InvalidEnvVar("NISSAHUB_CART_KEY".to_string(), e.to_string()))?;

        Ok(Self {
            data_dir: PathBuf::from(get_env_or_default("NISSAHUB_DATA_DIR", ".nissahub")),
            key,
        })
    }
}

impl ApiConfig {
    /// Load the marketplace endpoints from the environment.
    ///
    /// Does not read `.env`; callers load it first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `NISSAHUB_API_BASE_URL` is missing, or if
    /// either URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_url("NISSAHUB_API_BASE_URL")?;
        let checkout_url = match get_optional_env("NISSAHUB_CHECKOUT_URL") {
            Some(raw) => parse_url("NISSAHUB_CHECKOUT_URL", &raw)?,
            None => default_checkout_url(&base_url)?,
        };

        Ok(Self {
            base_url,
            checkout_url,
        })
    }

    /// Build endpoints from a base URL, with the default checkout path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the base URL does not parse.
    pub fn from_base(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_url("NISSAHUB_API_BASE_URL", base_url)?;
        let checkout_url = default_checkout_url(&base_url)?;
        Ok(Self {
            base_url,
            checkout_url,
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
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a required environment variable as an absolute http(s) URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let raw = get_required_env(key)?;
    parse_url(key, &raw)
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// `<base>/checkout`, keeping any path prefix on the base.
fn default_checkout_url(base_url: &Url) -> Result<Url, ConfigError> {
    join_path(base_url, "checkout")
        .map_err(|e| ConfigError::InvalidEnvVar("NISSAHUB_API_BASE_URL".to_string(), e.to_string()))
}

/// Join a relative path onto a base URL as if the base were a directory.
pub(crate) fn join_path(base_url: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_rejects_non_http() {
        let result = parse_url("TEST_URL", "ftp://example.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
        assert!(parse_url("TEST_URL", "not a url").is_err());
        assert!(parse_url("TEST_URL", "https://example.com").is_ok());
    }

    #[test]
    fn test_default_checkout_url() {
        let api = ApiConfig::from_base("https://nissahub.example").unwrap();
        assert_eq!(api.checkout_url.as_str(), "https://nissahub.example/checkout");

        let api = ApiConfig::from_base("https://example.com/app").unwrap();
        assert_eq!(api.checkout_url.as_str(), "https://example.com/app/checkout");
    }

    #[test]
    fn test_join_path_keeps_prefix() {
        let base = Url::parse("https://example.com/app").unwrap();
        let url = join_path(&base, "/skill/s1/discussion").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/skill/s1/discussion");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            cart: CartConfig {
                data_dir: PathBuf::from(".nissahub"),
                key: DEFAULT_CART_KEY.to_string(),
            },
            api: ApiConfig::from_base("http://localhost:5000").unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_cart_config_reads_process_env() {
        // SAFETY: no other test reads or writes these variables.
        unsafe {
            std::env::set_var("NISSAHUB_CART_KEY", "tab_cart");
            std::env::set_var("NISSAHUB_DATA_DIR", "/var/lib/nissahub");
        }
        let config = CartConfig::from_env().unwrap();
        assert_eq!(config.key, "tab_cart");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/nissahub"));

        unsafe {
            std::env::set_var("NISSAHUB_CART_KEY", "../escape");
        }
        assert!(matches!(
            CartConfig::from_env(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        unsafe {
            std::env::remove_var("NISSAHUB_CART_KEY");
            std::env::remove_var("NISSAHUB_DATA_DIR");
        }
    }
}
