//! Infrastructure layer - concrete query backends

pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmBackend};
pub use storage::InMemoryBackend;
