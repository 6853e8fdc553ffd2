// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use domain::{MetricsPtr, RepositoryPtr};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod services;
mod session;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::auth::TokenService;
pub use infrastructure::{
    create_memory_repository, // ---
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    PersistenceGateway,
};

/// Assemble the HTTP router around the given collaborators.
///
/// The caller owns the store lifecycle; the router only holds handles.
pub fn build_router(repository: RepositoryPtr, metrics: MetricsPtr, tokens: TokenService) -> Router {
    // ---
    let app_state = AppState::new(metrics, repository, tokens);

    let api = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/profile", get(handlers::get_profile))
        .route("/buy/{card_id}", post(handlers::buy_card))
        .route("/sell/{card_id}", post(handlers::sell_card))
        .route(
            "/wishlist/{card_id}",
            post(handlers::add_to_wishlist).delete(handlers::remove_from_wishlist),
        )
        .route(
            "/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route(
            "/cards/{id}",
            get(handlers::get_card)
                .patch(handlers::patch_card)
                .delete(handlers::delete_card),
        )
        .route("/cards/{id}/price", put(handlers::update_card_price))
        .route("/popular", get(handlers::popular_cards))
        .route("/simulate", get(handlers::simulate_market));

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api", api)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            handlers::track_requests,
        ))
        .with_state(app_state)
}

/// Build the HTTP router with collaborators determined by environment variables.
///
/// A PostgreSQL store is opened lazily on the first request; schema
/// migration is left to the binary.
pub fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    let metrics = match config.metrics {
        MetricsBackend::Prometheus => create_prom_metrics()?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let repository = match config.store {
        StoreConfig::Postgres(database) => {
            let gateway = Arc::new(PersistenceGateway::new(database));
            create_postgres_repository(gateway)
        }
        StoreConfig::Memory => create_memory_repository(),
    };

    let tokens = TokenService::from_config(&config.auth);

    Ok(build_router(repository, metrics, tokens))
}
