//! In-memory storage

mod like;
mod memory;

pub use like::{escape_like, like_match, like_to_glob};
pub use memory::{InMemoryBackend, MemoryQuery};
