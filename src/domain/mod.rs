mod error;
mod metrics;
mod models;
mod repository;

pub use error::MarketError;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose persistence abstractions and entities
pub use models::{Card, CardPatch, ListMove, NewCard, NewUser, PriceSample, User, UserList};
pub use repository::{Repository, RepositoryPtr};
