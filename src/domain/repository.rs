use super::models::{Card, CardPatch, ListMove, NewCard, NewUser, PriceSample, User};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for marketplace persistence.
///
/// Each method is a single store round-trip over one collection. Methods
/// that touch one document are atomic for that document; nothing spans
/// documents.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Cheap liveness probe against the store.
    async fn ping(&self) -> Result<()>;

    /// Insert a new user with empty lists.
    ///
    /// A duplicate username or email surfaces as a wrapped `MarketError::Conflict`.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Find a user whose username or email matches either argument.
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>>;

    /// Get user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Apply a list move to one user document. Returns whether a user matched.
    async fn move_card(&self, user_id: Uuid, change: ListMove) -> Result<bool>;

    /// Every user. Used by the full-scan "unsold" view.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Every card in the catalog.
    async fn list_cards(&self) -> Result<Vec<Card>>;

    /// Get card by ID.
    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>>;

    /// Resolve identifiers to cards, preserving input order and dropping misses.
    async fn get_cards_by_ids(&self, card_ids: &[Uuid]) -> Result<Vec<Card>>;

    /// Insert a card; the store assigns the identifier.
    async fn insert_card(&self, new_card: NewCard) -> Result<Card>;

    /// Set the current price and append the sample. Returns whether a card matched.
    async fn record_price(&self, card_id: Uuid, sample: PriceSample) -> Result<bool>;

    /// Apply a partial update. Returns the number of cards modified (0 or 1).
    async fn update_card(&self, card_id: Uuid, patch: CardPatch) -> Result<u64>;

    /// Delete a card. Returns the number of cards removed (0 or 1).
    async fn delete_card(&self, card_id: Uuid) -> Result<u64>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
