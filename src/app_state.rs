//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` contains the
//! repository, the metrics backend and the services built on top of them.
//!
//! The state is cheaply cloneable (services hold `Arc`s internally) so it
//! can be handed to each request without copying resources.

use crate::domain::{MetricsPtr, RepositoryPtr};
use crate::infrastructure::auth::{Argon2Hasher, TokenService};
use crate::services::{AuthService, CardCatalog, MarketSimulator, UserDirectory};
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the application.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics implementation for recording application events.
    metrics: MetricsPtr,

    /// Persistence abstraction; used directly only by the full health check.
    repository: RepositoryPtr,

    auth: AuthService,
    users: UserDirectory,
    cards: CardCatalog,
    market: MarketSimulator,
}

impl AppState {
    // ---

    pub fn new(metrics: MetricsPtr, repository: RepositoryPtr, tokens: TokenService) -> Self {
        // ---
        let hasher = Arc::new(Argon2Hasher::new());

        AppState {
            auth: AuthService::new(repository.clone(), hasher, tokens),
            users: UserDirectory::new(repository.clone()),
            cards: CardCatalog::new(repository.clone()),
            market: MarketSimulator::new(repository.clone()),
            metrics,
            repository,
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        &self.repository
    }

    pub(crate) fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub(crate) fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub(crate) fn cards(&self) -> &CardCatalog {
        &self.cards
    }

    pub(crate) fn market(&self) -> &MarketSimulator {
        &self.market
    }
}

#[cfg(test)]
mod tests {
    // ---

    use super::*;
    use crate::infrastructure::{create_memory_repository, create_noop_metrics};
    use std::time::Duration;

    #[tokio::test]
    async fn test_app_state_creation_and_clone() {
        // ---
        let metrics = create_noop_metrics().unwrap();
        let repository = create_memory_repository();
        let tokens = TokenService::new("state-secret", Duration::from_secs(60));

        let app_state = AppState::new(metrics, repository, tokens);
        let cloned = app_state.clone();

        // Clones share the same store.
        let card = app_state
            .cards()
            .create(crate::domain::NewCard {
                name: "Zapdos".to_string(),
                game: "Pokemon".to_string(),
                set: "Fossil".to_string(),
                price: Some(15.0),
            })
            .await
            .unwrap();
        assert_eq!(cloned.cards().get(card.id).await.unwrap().name, "Zapdos");

        assert!(cloned.repository().ping().await.is_ok());
        assert!(cloned.metrics().render().is_empty());
    }
}
