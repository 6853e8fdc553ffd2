// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod cards;
mod error;
mod extract;
mod health;
mod market;
mod metrics;
mod profile;
mod root;
mod shared_types;

#[cfg(test)]
mod tests;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_requests};
pub use root::root_handler;

// Account handlers
pub use auth::{login, register};

// Per-user list handlers
pub use profile::{add_to_wishlist, buy_card, get_profile, remove_from_wishlist, sell_card};

// Catalog handlers
pub use cards::{
    create_card, delete_card, get_card, list_cards, patch_card, popular_cards, update_card_price,
};

pub use market::simulate_market;
