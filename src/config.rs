//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use percent_encoding::percent_decode_str;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;

/// Default endpoint of the Goodreads review counts API
pub const DEFAULT_GOODREADS_URL: &str = "https://www.goodreads.com/book/review_counts.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_pool_size: usize,
    pub use_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            max_pool_size: 10,
            use_tls: false,
        }
    }
}

/// Goodreads ratings API configuration
#[derive(Debug, Clone)]
pub struct GoodreadsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Session cookie configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Only send the cookie over HTTPS
    pub secure: bool,
    /// Sessions expire after this many hours of inactivity
    pub ttl_hours: i64,
    /// How often expired sessions are deleted from the store
    pub purge_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure: false,
            ttl_hours: 24,
            purge_interval: Duration::from_secs(600),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub goodreads: GoodreadsConfig,
    pub session: SessionConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value source
    fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: var("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let database_url = var("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let max_pool_size = var("DB_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let database = Self::parse_database_url(&database_url, max_pool_size)?;

        let goodreads = GoodreadsConfig {
            api_key: var("GOODREADS_KEY")
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar("GOODREADS_KEY".to_string()))?,
            base_url: var("GOODREADS_URL").unwrap_or_else(|| DEFAULT_GOODREADS_URL.to_string()),
            timeout: Duration::from_secs(
                var("GOODREADS_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        };

        let session = SessionConfig {
            secure: var("SESSION_SECURE")
                .map(|s| matches!(s.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            ttl_hours: var("SESSION_TTL_HOURS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| SessionConfig::default().ttl_hours),
            purge_interval: var("SESSION_PURGE_INTERVAL_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| SessionConfig::default().purge_interval),
        };

        Ok(Self {
            server,
            database,
            goodreads,
            session,
        })
    }

    /// Parse a DATABASE_URL connection string (postgresql://...)
    fn parse_database_url(url: &str, max_pool_size: usize) -> Result<DatabaseConfig, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue(
                "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
            )
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported DATABASE_URL scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue("Missing host in DATABASE_URL".to_string()))?
            .to_string();

        let database = decode_component(parsed.path().trim_start_matches('/'), "database name")?;
        if database.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing database name in DATABASE_URL".to_string(),
            ));
        }

        // Neon and most hosted providers require TLS
        let use_tls = host.contains("neon.tech")
            || parsed
                .query_pairs()
                .any(|(k, v)| k == "sslmode" && v == "require");

        Ok(DatabaseConfig {
            port: parsed.port().unwrap_or(5432),
            user: decode_component(parsed.username(), "user")?,
            password: decode_component(parsed.password().unwrap_or_default(), "password")?,
            host,
            database,
            max_pool_size,
            use_tls,
        })
    }
}

/// URL components arrive percent-encoded (`p%40ss` for `p@ss`)
fn decode_component(raw: &str, what: &str) -> Result<String, ConfigError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ConfigError::InvalidValue(format!("DATABASE_URL {} is not valid UTF-8", what)))
}
