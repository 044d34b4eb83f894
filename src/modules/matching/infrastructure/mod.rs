pub mod match_cache;
pub mod models;
pub mod persistence;

pub use match_cache::{MatchCache, MatchCacheStats};
pub use persistence::{InMemoryMatchStore, SqliteMatchStore};
