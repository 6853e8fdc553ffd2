use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{Card, CardPatch, MarketError, NewCard, PriceSample, RepositoryPtr};

/// Look-back window for the popularity check.
pub const POPULAR_WINDOW_DAYS: i64 = 10;

/// Minimum price gain over the window for a card to count as popular.
pub const POPULAR_MIN_GAIN: f64 = 20.0;

/// Decides whether a price history shows a popular card at `now`.
///
/// The baseline is the latest sample taken on or before `now - 10 days`,
/// falling back to the earliest sample. Fewer than two samples is never
/// popular. The history need not be sorted.
pub fn is_popular(history: &[PriceSample], now: DateTime<Utc>) -> bool {
    // ---
    if history.len() < 2 {
        return false;
    }

    let mut sorted = history.to_vec();
    sorted.sort_by_key(|s| s.date);

    let cutoff = now - Duration::days(POPULAR_WINDOW_DAYS);
    let latest = sorted[sorted.len() - 1].price;
    let baseline = sorted
        .iter()
        .rev()
        .find(|s| s.date <= cutoff)
        .unwrap_or(&sorted[0])
        .price;

    latest - baseline >= POPULAR_MIN_GAIN
}

fn validate_price(price: f64) -> Result<f64, MarketError> {
    // ---
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(MarketError::validation("Price must be a non-negative number"))
    }
}

/// Card CRUD plus the filtered views.
#[derive(Clone)]
pub struct CardCatalog {
    // ---
    repository: RepositoryPtr,
}

impl CardCatalog {
    // ---
    pub fn new(repository: RepositoryPtr) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Card>, MarketError> {
        // ---
        self.repository
            .list_cards()
            .await
            .map_err(MarketError::from_store)
    }

    /// Cards that appear in no user's bought or sold list.
    ///
    /// Scans every user on each call.
    pub async fn list_unsold(&self) -> Result<Vec<Card>, MarketError> {
        // ---
        let users = self
            .repository
            .list_users()
            .await
            .map_err(MarketError::from_store)?;

        let taken: HashSet<Uuid> = users
            .iter()
            .flat_map(|u| u.bought.iter().chain(u.sold.iter()).copied())
            .collect();

        let cards = self.list().await?;
        Ok(cards.into_iter().filter(|c| !taken.contains(&c.id)).collect())
    }

    pub async fn list_popular(&self) -> Result<Vec<Card>, MarketError> {
        self.list_popular_at(Utc::now()).await
    }

    pub async fn list_popular_at(&self, now: DateTime<Utc>) -> Result<Vec<Card>, MarketError> {
        // ---
        let cards = self.list().await?;
        Ok(cards
            .into_iter()
            .filter(|c| is_popular(&c.price_history, now))
            .collect())
    }

    pub async fn get(&self, card_id: Uuid) -> Result<Card, MarketError> {
        // ---
        self.repository
            .get_card(card_id)
            .await
            .map_err(MarketError::from_store)?
            .ok_or_else(|| MarketError::not_found("Card not found"))
    }

    /// Inserts a card. A supplied price seeds the history with one sample.
    pub async fn create(&self, new_card: NewCard) -> Result<Card, MarketError> {
        // ---
        if new_card.name.trim().is_empty() {
            return Err(MarketError::validation("Card name is required"));
        }
        if let Some(price) = new_card.price {
            validate_price(price)?;
        }

        let card = self
            .repository
            .insert_card(new_card)
            .await
            .map_err(MarketError::from_store)?;

        tracing::info!("Created card {} ({})", card.name, card.id);
        Ok(card)
    }

    /// Sets the current price and appends it to the history.
    pub async fn update_price(&self, card_id: Uuid, new_price: f64) -> Result<Card, MarketError> {
        // ---
        let price = validate_price(new_price)?;

        let matched = self
            .repository
            .record_price(card_id, PriceSample::now(price))
            .await
            .map_err(MarketError::from_store)?;
        if !matched {
            return Err(MarketError::not_found("Card not found"));
        }

        self.get(card_id).await
    }

    /// Partial update of canonical fields. Returns the modified count.
    pub async fn patch(&self, card_id: Uuid, patch: CardPatch) -> Result<u64, MarketError> {
        // ---
        if patch.is_empty() {
            return Err(MarketError::validation("No fields to update"));
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(MarketError::validation("Card name must not be empty"));
        }

        let modified = self
            .repository
            .update_card(card_id, patch)
            .await
            .map_err(MarketError::from_store)?;

        if modified == 0 {
            return Err(MarketError::not_found("Card not found"));
        }
        Ok(modified)
    }

    pub async fn delete(&self, card_id: Uuid) -> Result<u64, MarketError> {
        // ---
        let deleted = self
            .repository
            .delete_card(card_id)
            .await
            .map_err(MarketError::from_store)?;

        if deleted == 0 {
            return Err(MarketError::not_found("Card not found"));
        }

        tracing::info!("Deleted card {}", card_id);
        Ok(deleted)
    }
}
