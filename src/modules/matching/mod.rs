// Cross-provider matching: scoring, match sets and the match cache

pub mod domain;
pub mod infrastructure;

pub use domain::services::{
    calculate_match_confidence, normalize_title, score_match, CrossProviderMatcher, MatchLookup,
    MatcherConfig, TitleFacts,
};
pub use domain::{MatchCacheKey, MatchCacheStore, MatchQuery, MatchSet, ProviderMatch};
pub use infrastructure::{InMemoryMatchStore, MatchCache, MatchCacheStats, SqliteMatchStore};
