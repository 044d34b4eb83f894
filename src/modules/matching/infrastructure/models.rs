use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::provider_match_cache;

/// One persisted match set
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = provider_match_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchCacheRow {
    pub cache_key: String,
    pub matches_json: String,
    pub updated_at: NaiveDateTime,
}
