use chrono::{Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Card, ListMove, MarketError, RepositoryPtr, UserList};

/// Profile summary with list identifiers resolved to cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    // ---
    pub username: String,
    pub email: String,
    pub wishlist: Vec<Card>,
    pub bought: Vec<Card>,
    pub sold: Vec<Card>,
    pub total_cards: usize,
    pub total_value: f64,
    pub member_since: i32,
}

/// Per-user wishlist / bought / sold management.
#[derive(Clone)]
pub struct UserDirectory {
    // ---
    repository: RepositoryPtr,
}

impl UserDirectory {
    // ---
    pub fn new(repository: RepositoryPtr) -> Self {
        Self { repository }
    }

    /// Builds the profile summary.
    ///
    /// Identifiers whose card no longer exists are dropped silently.
    /// `totalValue` and `totalCards` cover bought and sold cards only.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile, MarketError> {
        // ---
        let user = self
            .repository
            .get_user_by_id(user_id)
            .await
            .map_err(MarketError::from_store)?
            .ok_or_else(|| MarketError::not_found("User not found"))?;

        let (wishlist, bought, sold) = futures::try_join!(
            self.repository.get_cards_by_ids(user.list(UserList::Wishlist)),
            self.repository.get_cards_by_ids(user.list(UserList::Bought)),
            self.repository.get_cards_by_ids(user.list(UserList::Sold)),
        )
        .map_err(MarketError::from_store)?;

        let owned = bought.iter().chain(sold.iter());
        let total_value: f64 = owned.clone().map(|c| c.price.unwrap_or(0.0)).sum();
        let total_cards = owned.count();
        let member_since = user.created_at.unwrap_or_else(Utc::now).year();

        Ok(Profile {
            username: user.username,
            email: user.email,
            wishlist,
            bought,
            sold,
            total_cards,
            total_value,
            member_since,
        })
    }

    /// Adds the card to `bought` and drops it from `wishlist` in one update.
    pub async fn buy(&self, user_id: Uuid, card_id: Uuid) -> Result<Card, MarketError> {
        // ---
        let card = self.existing_card(card_id).await?;
        self.apply(user_id, ListMove::buy(card_id)).await?;

        tracing::info!("User {} bought card {}", user_id, card_id);
        Ok(card)
    }

    /// Moves the card to `sold`, off `bought` and the wishlist. Prior ownership is not checked.
    pub async fn sell(&self, user_id: Uuid, card_id: Uuid) -> Result<(), MarketError> {
        // ---
        self.apply(user_id, ListMove::sell(card_id)).await?;

        tracing::info!("User {} sold card {}", user_id, card_id);
        Ok(())
    }

    /// Rejects a card the user already bought or sold.
    pub async fn add_wishlist(&self, user_id: Uuid, card_id: Uuid) -> Result<Card, MarketError> {
        // ---
        let card = self.existing_card(card_id).await?;

        let user = self
            .repository
            .get_user_by_id(user_id)
            .await
            .map_err(MarketError::from_store)?
            .ok_or_else(|| MarketError::not_found("User not found"))?;
        let owned = [UserList::Bought, UserList::Sold]
            .into_iter()
            .any(|list| user.list(list).contains(&card_id));
        if owned {
            return Err(MarketError::validation("Card is already owned"));
        }

        // The move itself also refuses owned cards, covering a concurrent buy.
        self.apply(user_id, ListMove::wish(card_id)).await?;
        Ok(card)
    }

    /// Removing an identifier that is not on the wishlist succeeds.
    pub async fn remove_wishlist(&self, user_id: Uuid, card_id: Uuid) -> Result<(), MarketError> {
        // ---
        self.apply(user_id, ListMove::unwish(card_id)).await
    }

    async fn existing_card(&self, card_id: Uuid) -> Result<Card, MarketError> {
        // ---
        self.repository
            .get_card(card_id)
            .await
            .map_err(MarketError::from_store)?
            .ok_or_else(|| MarketError::not_found("Card not found"))
    }

    async fn apply(&self, user_id: Uuid, change: ListMove) -> Result<(), MarketError> {
        // ---
        let matched = self
            .repository
            .move_card(user_id, change)
            .await
            .map_err(MarketError::from_store)?;

        if matched {
            Ok(())
        } else {
            Err(MarketError::not_found("User not found"))
        }
    }
}
