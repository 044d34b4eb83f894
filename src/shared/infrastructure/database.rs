use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::connection::SimpleConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

use crate::shared::errors::AppError;
use crate::shared::utils::logger::LogContext;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas; concurrent readers must not fail on a busy writer
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;")
            .map_err(r2d2::Error::QueryError)
    }
}

#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the SQLite file at `path` and run pending migrations
    pub fn open(path: &str) -> Result<Self, AppError> {
        if path.trim().is_empty() {
            return Err(AppError::ConfigError(
                "Database path must not be empty".to_string(),
            ));
        }

        let manager = ConnectionManager::<SqliteConnection>::new(path);
        let pool = r2d2::Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create connection pool: {}", e))
            })?;

        let database = Self { pool };
        database.run_migrations()?;

        log::info!("Match cache database ready at {}", path);
        Ok(database)
    }

    /// Create a Database instance from an existing pool (useful for testing)
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    fn run_migrations(&self) -> Result<(), AppError> {
        let mut conn = self.get_connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }

    pub fn get_connection(&self) -> Result<DbConnection, AppError> {
        let start = std::time::Instant::now();
        let conn = self.pool.get()?;

        let duration = start.elapsed().as_millis() as u64;
        if duration > 100 {
            LogContext::performance_metric("db_connection_acquire", duration, Some("slow"));
        }
        Ok(conn)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::RunQueryDsl;

    #[test]
    fn test_open_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite3");
        let database = Database::open(path.to_str().unwrap()).unwrap();

        let mut conn = database.get_connection().unwrap();
        let rows = diesel::sql_query("SELECT cache_key FROM provider_match_cache")
            .execute(&mut conn)
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_empty_path_is_config_error() {
        assert!(matches!(Database::open("  "), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_unwritable_path_fails() {
        let result = Database::open("/nonexistent-dir/deeper/cache.sqlite3");
        assert!(result.is_err());
    }
}
