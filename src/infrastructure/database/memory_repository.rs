//! In-memory repository implementation.
//!
//! Mirrors the PostgreSQL semantics (store-assigned ids, unique username
//! and email, set-like list moves, single-document atomic updates) over
//! plain vectors guarded by one lock per collection.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Card, CardPatch, ListMove, MarketError, NewCard, NewUser, PriceSample, Repository,
    RepositoryPtr, User,
};

pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::new())
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    // ---
    users: RwLock<Vec<User>>,
    cards: RwLock<Vec<Card>>,
}

impl MemoryRepository {
    // ---
    pub fn new() -> Self {
        // ---
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        // ---
        let mut users = self.users.write().await;

        let taken = users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email);
        if taken {
            return Err(MarketError::conflict("User already exists").into());
        }

        let user = User::new(new_user);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        // ---
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn move_card(&self, user_id: Uuid, change: ListMove) -> Result<bool> {
        // ---
        let mut users = self.users.write().await;

        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.apply(&change);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn list_cards(&self) -> Result<Vec<Card>> {
        Ok(self.cards.read().await.clone())
    }

    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>> {
        // ---
        let cards = self.cards.read().await;
        Ok(cards.iter().find(|c| c.id == card_id).cloned())
    }

    async fn get_cards_by_ids(&self, card_ids: &[Uuid]) -> Result<Vec<Card>> {
        // ---
        let cards = self.cards.read().await;
        let by_id: HashMap<Uuid, &Card> = cards.iter().map(|c| (c.id, c)).collect();

        Ok(card_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|c| (*c).clone()))
            .collect())
    }

    async fn insert_card(&self, new_card: NewCard) -> Result<Card> {
        // ---
        let card = Card::new(Uuid::new_v4(), new_card);
        self.cards.write().await.push(card.clone());
        Ok(card)
    }

    async fn record_price(&self, card_id: Uuid, sample: PriceSample) -> Result<bool> {
        // ---
        let mut cards = self.cards.write().await;

        match cards.iter_mut().find(|c| c.id == card_id) {
            Some(card) => {
                card.record_price(sample);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_card(&self, card_id: Uuid, patch: CardPatch) -> Result<u64> {
        // ---
        let mut cards = self.cards.write().await;

        match cards.iter_mut().find(|c| c.id == card_id) {
            Some(card) => {
                card.apply_patch(&patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_card(&self, card_id: Uuid) -> Result<u64> {
        // ---
        let mut cards = self.cards.write().await;
        let before = cards.len();
        cards.retain(|c| c.id != card_id);
        Ok((before - cards.len()) as u64)
    }
}
