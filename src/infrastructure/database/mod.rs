mod gateway;
mod memory_repository;
mod postgres_repository;


pub use gateway::PersistenceGateway;
pub use memory_repository::create_memory_repository;
pub use postgres_repository::create_postgres_repository;
