use async_trait::async_trait;

use crate::modules::matching::domain::entities::{MatchCacheKey, MatchSet};
use crate::shared::errors::AppResult;

/// Storage backend for match sets
///
/// Writes are upserts; a `put` for an existing key replaces the stored set.
#[async_trait]
pub trait MatchCacheStore: Send + Sync {
    /// Prepare the backend (open files, run migrations). Safe to call twice.
    async fn init(&self) -> AppResult<()>;

    async fn get(&self, key: &MatchCacheKey) -> AppResult<Option<MatchSet>>;

    async fn put(&self, key: &MatchCacheKey, matches: &MatchSet) -> AppResult<()>;

    async fn delete(&self, key: &MatchCacheKey) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
