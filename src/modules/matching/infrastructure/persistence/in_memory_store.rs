use async_trait::async_trait;
use dashmap::DashMap;

use crate::modules::matching::domain::entities::{MatchCacheKey, MatchSet};
use crate::modules::matching::domain::repositories::MatchCacheStore;
use crate::shared::errors::AppResult;

/// Process-local store; contents are lost when the engine is dropped
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    entries: DashMap<MatchCacheKey, MatchSet>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MatchCacheStore for InMemoryMatchStore {
    async fn init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn get(&self, key: &MatchCacheKey) -> AppResult<Option<MatchSet>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &MatchCacheKey, matches: &MatchSet) -> AppResult<()> {
        self.entries.insert(key.clone(), matches.clone());
        Ok(())
    }

    async fn delete(&self, key: &MatchCacheKey) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
