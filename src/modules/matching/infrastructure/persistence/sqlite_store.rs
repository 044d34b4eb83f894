use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task;

use crate::modules::matching::domain::entities::{MatchCacheKey, MatchSet};
use crate::modules::matching::domain::repositories::MatchCacheStore;
use crate::modules::matching::infrastructure::models::MatchCacheRow;
use crate::schema::provider_match_cache;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

/// Match sets persisted in the `provider_match_cache` SQLite table
pub struct SqliteMatchStore {
    path: String,
    db: OnceCell<Arc<Database>>,
}

impl SqliteMatchStore {
    /// Store backed by the file at `path`; nothing is opened until [`init`](MatchCacheStore::init)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            db: OnceCell::new(),
        }
    }

    /// Store over an already opened database
    pub fn from_database(db: Arc<Database>) -> Self {
        Self {
            path: String::new(),
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn database(&self) -> AppResult<Arc<Database>> {
        self.db.get().cloned().ok_or_else(|| {
            AppError::CacheError(format!("Match cache at '{}' is not initialised", self.path))
        })
    }
}

#[async_trait]
impl MatchCacheStore for SqliteMatchStore {
    async fn init(&self) -> AppResult<()> {
        self.db
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let db = task::spawn_blocking(move || Database::open(&path)).await??;
                Ok::<_, AppError>(Arc::new(db))
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: &MatchCacheKey) -> AppResult<Option<MatchSet>> {
        let db = self.database()?;
        let key = key.as_str().to_string();

        let row = task::spawn_blocking(move || -> AppResult<Option<MatchCacheRow>> {
            let mut conn = db.get_connection()?;

            let row = provider_match_cache::table
                .find(key.as_str())
                .select(MatchCacheRow::as_select())
                .first::<MatchCacheRow>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??;

        row.map(|row| serde_json::from_str::<MatchSet>(&row.matches_json))
            .transpose()
            .map_err(AppError::from)
    }

    async fn put(&self, key: &MatchCacheKey, matches: &MatchSet) -> AppResult<()> {
        let db = self.database()?;
        let row = MatchCacheRow {
            cache_key: key.as_str().to_string(),
            matches_json: serde_json::to_string(matches)?,
            updated_at: chrono::Utc::now().naive_utc(),
        };

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;

            diesel::replace_into(provider_match_cache::table)
                .values(&row)
                .execute(&mut conn)?;

            Ok(())
        })
        .await?
    }

    async fn delete(&self, key: &MatchCacheKey) -> AppResult<()> {
        let db = self.database()?;
        let key = key.as_str().to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            diesel::delete(provider_match_cache::table.find(key.as_str())).execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn clear(&self) -> AppResult<()> {
        let db = self.database()?;

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            let removed = diesel::delete(provider_match_cache::table).execute(&mut conn)?;
            tracing::debug!(removed, "Cleared match cache table");
            Ok(())
        })
        .await?
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
