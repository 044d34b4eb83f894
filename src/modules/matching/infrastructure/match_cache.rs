use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::persistence::{InMemoryMatchStore, SqliteMatchStore};
use crate::modules::matching::domain::entities::{MatchCacheKey, MatchSet};
use crate::modules::matching::domain::repositories::MatchCacheStore;
use crate::shared::config::IN_MEMORY_CACHE;
use crate::shared::utils::logger::LogContext;

/// Hit/miss counters of a [`MatchCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// False once initialisation failed and the cache only misses
    pub available: bool,
}

/// Read-through cache in front of a [`MatchCacheStore`].
///
/// Never fails: a store that cannot be initialised turns every lookup into a
/// miss, and read/write errors are logged and swallowed.
pub struct MatchCache {
    store: Arc<dyn MatchCacheStore>,
    ready: OnceCell<bool>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MatchCache {
    pub fn new(store: Arc<dyn MatchCacheStore>) -> Self {
        Self {
            store,
            ready: OnceCell::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMatchStore::new()))
    }

    /// SQLite file at `path`, or the in-memory store for `:memory:`
    pub fn for_path(path: &str) -> Self {
        if path == IN_MEMORY_CACHE {
            Self::in_memory()
        } else {
            Self::new(Arc::new(SqliteMatchStore::new(path)))
        }
    }

    /// Initialise the store once; later calls return the first outcome
    pub async fn init(&self) -> bool {
        *self
            .ready
            .get_or_init(|| async {
                match self.store.init().await {
                    Ok(()) => {
                        tracing::debug!(store = self.store.name(), "Match cache initialised");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            store = self.store.name(),
                            error = %e,
                            "Match cache unavailable, continuing without it"
                        );
                        false
                    }
                }
            })
            .await
    }

    pub async fn get(&self, key: &MatchCacheKey) -> Option<MatchSet> {
        let found = if self.init().await {
            match self.store.get(key).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Match cache read failed");
                    None
                }
            }
        } else {
            None
        };

        LogContext::cache_lookup(key.as_str(), found.is_some());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub async fn put(&self, key: &MatchCacheKey, matches: &MatchSet) {
        if !self.init().await {
            return;
        }
        if let Err(e) = self.store.put(key, matches).await {
            tracing::warn!(key = %key, error = %e, "Match cache write failed");
        }
    }

    pub async fn delete(&self, key: &MatchCacheKey) {
        if !self.init().await {
            return;
        }
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Match cache delete failed");
        }
    }

    pub async fn clear(&self) {
        if !self.init().await {
            return;
        }
        match self.store.clear().await {
            Ok(()) => tracing::info!(store = self.store.name(), "Match cache cleared"),
            Err(e) => tracing::warn!(error = %e, "Match cache clear failed"),
        }
    }

    pub fn stats(&self) -> MatchCacheStats {
        MatchCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            available: self.ready.get().copied().unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::domain::{MediaType, ProviderId};

    fn key() -> MatchCacheKey {
        MatchCacheKey::new("Berserk", MediaType::Manga, ProviderId::AniList, None)
    }

    #[tokio::test]
    async fn test_counts_hits_and_misses() {
        let cache = MatchCache::in_memory();

        assert!(cache.get(&key()).await.is_none());
        cache.put(&key(), &MatchSet::new()).await;
        assert_eq!(cache.get(&key()).await, Some(MatchSet::new()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!(stats.available);
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_miss() {
        let cache = MatchCache::for_path("/nonexistent-dir/deeper/matches.sqlite3");

        assert!(!cache.init().await);
        cache.put(&key(), &MatchSet::new()).await;
        assert!(cache.get(&key()).await.is_none());
        cache.clear().await;

        let stats = cache.stats();
        assert!(!stats.available);
        assert_eq!(stats.misses, 1);
    }
}
