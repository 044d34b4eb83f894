pub mod entities;
pub mod repositories;
pub mod services;

pub use entities::{MatchCacheKey, MatchQuery, MatchSet, ProviderMatch};
pub use repositories::MatchCacheStore;
