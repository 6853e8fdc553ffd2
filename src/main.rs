use anyhow::Result;
use card_market::{
    build_router, create_memory_repository, create_noop_metrics, create_postgres_repository,
    create_prom_metrics, AppConfig, MetricsBackend, PersistenceGateway, StoreConfig, TokenService,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!("Loaded configuration: {:?}", config.auth);

    let metrics = match config.metrics {
        MetricsBackend::Prometheus => create_prom_metrics()?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    // The gateway is owned here so the pool is torn down after the server stops.
    let (repository, gateway) = match &config.store {
        StoreConfig::Postgres(database) => {
            let gateway = Arc::new(PersistenceGateway::new(database.clone()));
            gateway.connect().await?;
            gateway.migrate().await?;
            (create_postgres_repository(gateway.clone()), Some(gateway))
        }
        StoreConfig::Memory => {
            warn!("Using the in-memory store; data is lost on exit");
            (create_memory_repository(), None)
        }
    };

    let tokens = TokenService::from_config(&config.auth);
    let app = build_router(repository, metrics, tokens);

    let endpoint = config.server.bind_addr();
    info!("Starting at endpoint:{}", endpoint);
    info!("Starting Card Market API server v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(gateway) = gateway {
        gateway.close().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
