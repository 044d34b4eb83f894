pub mod match_cache_store;

pub use match_cache_store::MatchCacheStore;
