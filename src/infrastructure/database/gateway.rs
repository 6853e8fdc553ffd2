//! Process-wide handle to the PostgreSQL store.
//!
//! The gateway is constructed by the entry point and passed down; it opens
//! its pool on the first `connect()` and hands back the same pool after
//! that. It never reconnects on its own.

use crate::config::DatabaseConfig;
use crate::domain::MarketError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use tokio::sync::OnceCell;

pub struct PersistenceGateway {
    // ---
    config: DatabaseConfig,
    pool: OnceCell<PgPool>,
}

impl PersistenceGateway {
    // ---
    pub fn new(config: DatabaseConfig) -> Self {
        // ---
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// Returns the shared pool, opening it on first use.
    ///
    /// Concurrent first callers wait on the same connection attempt. A
    /// failed attempt is not cached, so a later call tries again.
    ///
    /// # Errors
    /// `MarketError::Connection` for a malformed URL or an unreachable store.
    pub async fn connect(&self) -> Result<PgPool, MarketError> {
        // ---
        let pool = self
            .pool
            .get_or_try_init(|| async { self.open().await })
            .await?;

        Ok(pool.clone())
    }

    async fn open(&self) -> Result<PgPool, MarketError> {
        // ---
        let mut options = PgConnectOptions::from_str(&self.config.database_url).map_err(|e| {
            tracing::error!("Invalid database URL: {}", e);
            MarketError::connection("invalid database URL")
        })?;

        if let Some(name) = &self.config.database_name {
            options = options.database(name);
        }

        let pool = PgPoolOptions::new()
            .min_connections(self.config.min_connections)
            .max_connections(self.config.max_connections)
            .acquire_timeout(self.config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!("Error connecting to database: {}", e);
                MarketError::connection(e.to_string())
            })?;

        tracing::info!("Connected to database");
        Ok(pool)
    }

    /// Applies pending schema migrations from `./migrations`.
    pub async fn migrate(&self) -> Result<(), MarketError> {
        // ---
        let pool = self.connect().await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            MarketError::operation(e.to_string())
        })
    }

    /// True once a pool has been opened.
    pub fn is_connected(&self) -> bool {
        // ---
        self.pool.initialized()
    }

    /// Closes the pool if it was ever opened. Called once at shutdown.
    pub async fn close(&self) {
        // ---
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Database pool closed");
        }
    }
}
