//! Business operations over the injected repository.
//!
//! Services own validation and the mapping of store results onto the
//! `MarketError` taxonomy. They are cheap to clone and hold no state
//! beyond their collaborators.

mod auth;
mod catalog;
mod directory;
mod market;

pub use auth::AuthService;
pub use catalog::CardCatalog;
pub use directory::{Profile, UserDirectory};
pub use market::MarketSimulator;

use crate::domain::MarketError;
use uuid::Uuid;

/// Parses a path identifier. Anything that is not a UUID cannot name a
/// stored entity and is rejected before touching the store.
pub fn parse_id(raw: &str) -> Result<Uuid, MarketError> {
    // ---
    Uuid::parse_str(raw).map_err(|_| MarketError::invalid_identifier("Invalid card ID format"))
}
