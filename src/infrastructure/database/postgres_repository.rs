use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::gateway::PersistenceGateway;
use crate::domain::{
    Card, CardPatch, ListMove, MarketError, NewCard, NewUser, PriceSample, Repository, User,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, wishlist, bought, sold";
const CARD_COLUMNS: &str = "id, name, game, set_label, price, price_history";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: Option<DateTime<Utc>>,
    wishlist: Vec<Uuid>,
    bought: Vec<Uuid>,
    sold: Vec<Uuid>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            created_at: r.created_at,
            wishlist: r.wishlist,
            bought: r.bought,
            sold: r.sold,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: Uuid,
    name: String,
    game: String,
    set_label: String,
    price: Option<f64>,
    price_history: Json<Vec<PriceSample>>,
}

impl From<CardRow> for Card {
    fn from(r: CardRow) -> Self {
        Card {
            id: r.id,
            name: r.name,
            game: r.game,
            set: r.set_label,
            price: r.price,
            price_history: r.price_history.0,
        }
    }
}

pub fn create_postgres_repository(gateway: Arc<PersistenceGateway>) -> crate::domain::RepositoryPtr {
    // ---
    Arc::new(PostgresRepository::new(gateway))
}

/// `Repository` backed by the PostgreSQL gateway.
///
/// Every call asks the gateway for its pool, so the first store access
/// opens the connection if `main` has not already done so.
pub struct PostgresRepository {
    // ---
    gateway: Arc<PersistenceGateway>,
}

impl PostgresRepository {
    // ---
    pub fn new(gateway: Arc<PersistenceGateway>) -> Self {
        // ---
        Self { gateway }
    }

    async fn pool(&self) -> Result<PgPool> {
        // ---
        Ok(self.gateway.connect().await?)
    }
}

/// Builds the `SET` clause for a list move. Both columns come from
/// `UserList::column`, never from input.
fn list_move_assignments(change: &ListMove) -> Vec<String> {
    // ---
    let mut assignments = Vec::with_capacity(change.remove_from.len() + 1);

    for from in change.remove_from {
        let col = from.column();
        assignments.push(format!("{col} = array_remove({col}, $2)"));
    }
    if let Some(to) = change.add_to {
        // SET expressions read the pre-update row, so the guard sees the old lists.
        let col = to.column();
        let present = std::iter::once(col)
            .chain(change.unless_in.iter().map(|list| list.column()))
            .map(|c| format!("$2 = ANY({c})"))
            .collect::<Vec<_>>()
            .join(" OR ");
        assignments.push(format!(
            "{col} = CASE WHEN {present} THEN {col} ELSE array_append({col}, $2) END"
        ));
    }

    assignments
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        // ---
        let pool = self.pool().await?;

        let inserted = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ($1, $2, $3, now())
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(MarketError::conflict("User already exists").into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        // ---
        let pool = self.pool().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        let pool = self.pool().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let pool = self.pool().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn move_card(&self, user_id: Uuid, change: ListMove) -> Result<bool> {
        // ---
        let assignments = list_move_assignments(&change);
        if assignments.is_empty() {
            return Ok(self.get_user_by_id(user_id).await?.is_some());
        }

        let pool = self.pool().await?;
        let sql = format!("UPDATE users SET {} WHERE id = $1", assignments.join(", "));

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(change.card_id)
            .execute(&pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        // ---
        let pool = self.pool().await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(&pool)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list_cards(&self) -> Result<Vec<Card>> {
        // ---
        let pool = self.pool().await?;

        let rows = sqlx::query_as::<_, CardRow>(&format!("SELECT {CARD_COLUMNS} FROM cards"))
            .fetch_all(&pool)
            .await?;

        Ok(rows.into_iter().map(Card::from).collect())
    }

    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>> {
        // ---
        let pool = self.pool().await?;

        let row = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"
        ))
        .bind(card_id)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(Card::from))
    }

    async fn get_cards_by_ids(&self, card_ids: &[Uuid]) -> Result<Vec<Card>> {
        // ---
        if card_ids.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool().await?;

        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = ANY($1)"
        ))
        .bind(card_ids)
        .fetch_all(&pool)
        .await?;

        let mut by_id: HashMap<Uuid, Card> =
            rows.into_iter().map(|r| (r.id, Card::from(r))).collect();

        Ok(card_ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn insert_card(&self, new_card: NewCard) -> Result<Card> {
        // ---
        let pool = self.pool().await?;
        let history: Vec<PriceSample> = new_card.price.map(PriceSample::now).into_iter().collect();

        let row = sqlx::query_as::<_, CardRow>(&format!(
            "INSERT INTO cards (name, game, set_label, price, price_history)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CARD_COLUMNS}"
        ))
        .bind(&new_card.name)
        .bind(&new_card.game)
        .bind(&new_card.set)
        .bind(new_card.price)
        .bind(Json(history))
        .fetch_one(&pool)
        .await?;

        Ok(row.into())
    }

    async fn record_price(&self, card_id: Uuid, sample: PriceSample) -> Result<bool> {
        // ---
        let pool = self.pool().await?;

        let result = sqlx::query(
            "UPDATE cards SET price = $2, price_history = price_history || $3 WHERE id = $1",
        )
        .bind(card_id)
        .bind(sample.price)
        .bind(Json(vec![sample]))
        .execute(&pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_card(&self, card_id: Uuid, patch: CardPatch) -> Result<u64> {
        // ---
        let pool = self.pool().await?;
        let appended: Vec<PriceSample> = patch.price.map(PriceSample::now).into_iter().collect();

        let result = sqlx::query(
            "UPDATE cards SET
                 name = COALESCE($2, name),
                 game = COALESCE($3, game),
                 set_label = COALESCE($4, set_label),
                 price = COALESCE($5, price),
                 price_history = price_history || $6
             WHERE id = $1",
        )
        .bind(card_id)
        .bind(patch.name)
        .bind(patch.game)
        .bind(patch.set)
        .bind(patch.price)
        .bind(Json(appended))
        .execute(&pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_card(&self, card_id: Uuid) -> Result<u64> {
        // ---
        let pool = self.pool().await?;

        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(card_id)
            .execute(&pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn buy_assignments_remove_then_add() {
        // ---
        let sql = list_move_assignments(&ListMove::buy(Uuid::nil()));

        assert_eq!(sql.len(), 2);
        assert_eq!(sql[0], "wishlist = array_remove(wishlist, $2)");
        assert!(sql[1].starts_with("bought = CASE WHEN $2 = ANY(bought)"));
    }

    #[test]
    fn sell_clears_bought_and_wishlist_in_one_statement() {
        // ---
        let sql = list_move_assignments(&ListMove::sell(Uuid::nil()));

        assert_eq!(sql.len(), 3);
        assert_eq!(sql[0], "bought = array_remove(bought, $2)");
        assert_eq!(sql[1], "wishlist = array_remove(wishlist, $2)");
        assert!(sql[2].starts_with("sold = CASE WHEN $2 = ANY(sold) THEN"));
    }

    #[test]
    fn wish_is_guarded_by_owned_lists() {
        // ---
        let sql = list_move_assignments(&ListMove::wish(Uuid::nil()));

        assert_eq!(
            sql,
            vec![
                "wishlist = CASE WHEN $2 = ANY(wishlist) OR $2 = ANY(bought) OR $2 = ANY(sold) \
                 THEN wishlist ELSE array_append(wishlist, $2) END"
                    .to_string()
            ]
        );
    }

    #[test]
    fn unwish_touches_only_wishlist() {
        // ---
        let sql = list_move_assignments(&ListMove::unwish(Uuid::nil()));

        assert_eq!(sql, vec!["wishlist = array_remove(wishlist, $2)".to_string()]);
    }
}
