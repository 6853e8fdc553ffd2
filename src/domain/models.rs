use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered marketplace account.
///
/// The three lists hold card identifiers by value; a referenced card may
/// have been deleted since it was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    // ---
    pub id: Uuid,
    pub username: String,
    pub email: String,

    /// PHC-format password hash. Never leaves the service layer.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Absent on records imported without a creation date.
    pub created_at: Option<DateTime<Utc>>,
    pub wishlist: Vec<Uuid>,
    pub bought: Vec<Uuid>,
    pub sold: Vec<Uuid>,
}

impl User {
    // ---
    pub fn new(new_user: NewUser) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Some(Utc::now()),
            wishlist: Vec::new(),
            bought: Vec::new(),
            sold: Vec::new(),
        }
    }

    pub fn list(&self, list: UserList) -> &[Uuid] {
        // ---
        match list {
            UserList::Wishlist => &self.wishlist,
            UserList::Bought => &self.bought,
            UserList::Sold => &self.sold,
        }
    }

    fn list_mut(&mut self, list: UserList) -> &mut Vec<Uuid> {
        // ---
        match list {
            UserList::Wishlist => &mut self.wishlist,
            UserList::Bought => &mut self.bought,
            UserList::Sold => &mut self.sold,
        }
    }

    /// Applies a list move in place with set semantics on the target list.
    pub fn apply(&mut self, change: &ListMove) {
        // ---
        let blocked = change
            .unless_in
            .iter()
            .any(|list| self.list(*list).contains(&change.card_id));

        for from in change.remove_from {
            self.list_mut(*from).retain(|id| *id != change.card_id);
        }
        if let Some(to) = change.add_to {
            let entries = self.list_mut(to);
            if !blocked && !entries.contains(&change.card_id) {
                entries.push(change.card_id);
            }
        }
    }
}

/// Fields needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    // ---
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// One of the three per-user card lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserList {
    Wishlist,
    Bought,
    Sold,
}

impl UserList {
    /// Column holding this list in the `users` table.
    pub fn column(self) -> &'static str {
        // ---
        match self {
            UserList::Wishlist => "wishlist",
            UserList::Bought => "bought",
            UserList::Sold => "sold",
        }
    }
}

/// Moves a card identifier between a user's lists in one update.
///
/// `add_to` uses set semantics and is skipped when the card already sits
/// in any `unless_in` list; `remove_from` never fails on absence. A card
/// is never on the wishlist and in bought/sold at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMove {
    // ---
    pub card_id: Uuid,
    pub add_to: Option<UserList>,
    pub remove_from: &'static [UserList],
    pub unless_in: &'static [UserList],
}

impl ListMove {
    // ---
    pub fn buy(card_id: Uuid) -> Self {
        Self {
            card_id,
            add_to: Some(UserList::Bought),
            remove_from: &[UserList::Wishlist],
            unless_in: &[],
        }
    }

    pub fn sell(card_id: Uuid) -> Self {
        Self {
            card_id,
            add_to: Some(UserList::Sold),
            remove_from: &[UserList::Bought, UserList::Wishlist],
            unless_in: &[],
        }
    }

    /// Owned cards stay off the wishlist.
    pub fn wish(card_id: Uuid) -> Self {
        Self {
            card_id,
            add_to: Some(UserList::Wishlist),
            remove_from: &[],
            unless_in: &[UserList::Bought, UserList::Sold],
        }
    }

    pub fn unwish(card_id: Uuid) -> Self {
        Self {
            card_id,
            add_to: None,
            remove_from: &[UserList::Wishlist],
            unless_in: &[],
        }
    }
}

/// A point in a card's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    // ---
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    // ---
    pub fn now(price: f64) -> Self {
        // ---
        Self {
            date: Utc::now(),
            price,
        }
    }
}

/// A tradeable card in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    // ---
    pub id: Uuid,
    pub name: String,
    pub game: String,
    pub set: String,

    /// Current price; equals the last history sample after any price change.
    pub price: Option<f64>,
    pub price_history: Vec<PriceSample>,
}

impl Card {
    // ---
    pub fn new(id: Uuid, new_card: NewCard) -> Self {
        // ---
        let price_history = new_card
            .price
            .map(|price| vec![PriceSample::now(price)])
            .unwrap_or_default();

        Self {
            id,
            name: new_card.name,
            game: new_card.game,
            set: new_card.set,
            price: new_card.price,
            price_history,
        }
    }

    /// Sets the current price and appends the matching history sample.
    pub fn record_price(&mut self, sample: PriceSample) {
        // ---
        self.price = Some(sample.price);
        self.price_history.push(sample);
    }

    /// Applies the non-empty fields of a patch. A patched price is recorded
    /// as a new history sample.
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        // ---
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(game) = &patch.game {
            self.game = game.clone();
        }
        if let Some(set) = &patch.set {
            self.set = set.clone();
        }
        if let Some(price) = patch.price {
            self.record_price(PriceSample::now(price));
        }
    }
}

/// Inbound fields for a catalog insert.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCard {
    // ---
    pub name: String,
    pub game: String,
    pub set: String,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Partial update of a card's canonical fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardPatch {
    // ---
    pub name: Option<String>,
    pub game: Option<String>,
    pub set: Option<String>,
    pub price: Option<f64>,
}

impl CardPatch {
    // ---
    pub fn is_empty(&self) -> bool {
        // ---
        self.name.is_none() && self.game.is_none() && self.set.is_none() && self.price.is_none()
    }
}
