// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. Appropriate for non-critical tuning
/// parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub metrics: MetricsBackend,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            store: StoreConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            server: ServerConfig::from_env(),
            metrics: MetricsBackend::from_env(),
        })
    }
}

// ============================================================
// Store selection
// ============================================================

/// Which persistence backend serves the repository.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// PostgreSQL via a pooled connection.
    Postgres(DatabaseConfig),

    /// Process-local store; contents vanish on exit.
    Memory,
}

impl StoreConfig {
    /// Reads `MARKET_STORE` (`postgres` by default, or `memory`).
    ///
    /// # Errors
    /// Unknown backend names are rejected, as is a postgres backend
    /// without `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        // ---
        let backend = std::env::var("MARKET_STORE").unwrap_or_else(|_| "postgres".to_string());

        match backend.as_str() {
            "postgres" => Ok(Self::Postgres(DatabaseConfig::from_env()?)),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unsupported MARKET_STORE value: {other}"),
        }
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Overrides the database named in the URL when set.
        pub database_name: Option<String>,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 1.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 10.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let database_name = std::env::var("MARKET_DB_NAME")
                .ok()
                .filter(|name| !name.is_empty());
            let acquire_timeout_secs = optional_env_parse!("MARKET_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("MARKET_DB_MIN_CONNECTIONS", u32, 1);
            let max_connections = optional_env_parse!("MARKET_DB_MAX_CONNECTIONS", u32, 10);

            Ok(Self {
                database_url,
                database_name,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Credential configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Signing configuration for bearer credentials.
    #[derive(Clone)]
    pub struct AuthConfig {
        /// HMAC secret used to sign and verify credentials.
        pub jwt_secret: String,

        /// Validity window of an issued credential. Defaults to 24 hours.
        pub token_ttl: Duration,
    }

    impl std::fmt::Debug for AuthConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("AuthConfig")
                .field("jwt_secret", &"[hidden]")
                .field("token_ttl", &self.token_ttl)
                .finish()
        }
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// The signing secret is security-critical and must be explicitly provided.
        pub fn from_env() -> Result<Self> {
            // ---
            let jwt_secret = required_env!("JWT_SECRET");
            if jwt_secret.trim().is_empty() {
                anyhow::bail!("JWT_SECRET must not be empty");
            }
            let ttl_hours = optional_env_parse!("MARKET_TOKEN_TTL_HOURS", u64, 24);

            Ok(Self {
                jwt_secret,
                token_ttl: Duration::from_secs(ttl_hours * 3600),
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Listener configuration
// ============================================================

/// Where the HTTP listener binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    // ---
    pub fn from_env() -> Self {
        // ---
        Self {
            host: std::env::var("MARKET_BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: optional_env_parse!("PORT", u16, 5000),
        }
    }

    pub fn bind_addr(&self) -> String {
        // ---
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================
// Metrics backend selection
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsBackend {
    Prometheus,
    Noop,
}

impl MetricsBackend {
    /// Reads `MARKET_METRICS_TYPE`; only `prom` selects Prometheus.
    pub fn from_env() -> Self {
        // ---
        match std::env::var("MARKET_METRICS_TYPE").as_deref() {
            Ok("prom") => Self::Prometheus,
            _ => Self::Noop,
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use anyhow::Result;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_database_url_fails() -> Result<()> {
        // ---
        std::env::remove_var("DATABASE_URL");

        assert_missing_config!(database::DatabaseConfig::from_env(), "DATABASE_URL");

        Ok(())
    }

    #[test]
    #[serial]
    fn database_defaults_applied() -> Result<()> {
        // ---
        let db_url = "postgres://test";
        std::env::set_var("DATABASE_URL", db_url);

        std::env::remove_var("MARKET_DB_NAME");
        std::env::remove_var("MARKET_DB_ACQUIRE_TIMEOUT_SEC");
        std::env::remove_var("MARKET_DB_MIN_CONNECTIONS");
        std::env::remove_var("MARKET_DB_MAX_CONNECTIONS");

        let cfg = database::DatabaseConfig::from_env()?;
        assert_eq!(cfg.database_url, db_url);
        assert_eq!(cfg.database_name, None);
        assert_eq!(cfg.acquire_timeout.as_secs(), 30);
        assert_eq!(cfg.min_connections, 1);
        assert_eq!(cfg.max_connections, 10);

        Ok(())
    }

    #[test]
    #[serial]
    fn database_overrides_defaults() -> Result<()> {
        // ---
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("MARKET_DB_NAME", "cards");
        std::env::set_var("MARKET_DB_ACQUIRE_TIMEOUT_SEC", "5");
        std::env::set_var("MARKET_DB_MIN_CONNECTIONS", "3");
        std::env::set_var("MARKET_DB_MAX_CONNECTIONS", "40");

        let cfg = database::DatabaseConfig::from_env()?;
        assert_eq!(cfg.database_name.as_deref(), Some("cards"));
        assert_eq!(cfg.acquire_timeout.as_secs(), 5);
        assert_eq!(cfg.min_connections, 3);
        assert_eq!(cfg.max_connections, 40);

        std::env::remove_var("MARKET_DB_NAME");
        std::env::remove_var("MARKET_DB_ACQUIRE_TIMEOUT_SEC");
        std::env::remove_var("MARKET_DB_MIN_CONNECTIONS");
        std::env::remove_var("MARKET_DB_MAX_CONNECTIONS");

        Ok(())
    }

    #[test]
    #[serial]
    fn missing_jwt_secret_fails() -> Result<()> {
        // ---
        std::env::remove_var("JWT_SECRET");

        assert_missing_config!(AuthConfig::from_env(), "JWT_SECRET");

        Ok(())
    }

    #[test]
    #[serial]
    fn auth_config_hides_secret_in_debug() -> Result<()> {
        // ---
        std::env::set_var("JWT_SECRET", "very-secret");
        std::env::remove_var("MARKET_TOKEN_TTL_HOURS");

        let cfg = AuthConfig::from_env()?;
        assert_eq!(cfg.token_ttl.as_secs(), 24 * 3600);
        assert!(!format!("{cfg:?}").contains("very-secret"));

        Ok(())
    }

    #[test]
    #[serial]
    fn memory_store_needs_no_database_url() -> Result<()> {
        // ---
        std::env::set_var("MARKET_STORE", "memory");
        std::env::remove_var("DATABASE_URL");

        let store = StoreConfig::from_env()?;
        assert!(matches!(store, StoreConfig::Memory));

        std::env::set_var("MARKET_STORE", "mongo");
        assert!(StoreConfig::from_env().is_err());

        std::env::remove_var("MARKET_STORE");
        Ok(())
    }

    #[test]
    #[serial]
    fn app_config_from_env_success() -> Result<()> {
        // ---
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("JWT_SECRET", "secret");
        std::env::remove_var("MARKET_STORE");
        std::env::remove_var("MARKET_BIND_HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("MARKET_METRICS_TYPE");

        let cfg = AppConfig::from_env()?;
        assert!(matches!(cfg.store, StoreConfig::Postgres(_)));
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.metrics, MetricsBackend::Noop);

        Ok(())
    }
}
