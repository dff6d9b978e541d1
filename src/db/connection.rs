//! Database connection management

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Type alias for the database pool
pub type DbPool = SqlitePool;

/// Statements executed on startup. `IF NOT EXISTS` keeps re-runs harmless.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS import_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        payload TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        attempts INTEGER NOT NULL DEFAULT 0,
        max_attempts INTEGER NOT NULL DEFAULT 3,
        claimed_by TEXT,
        last_error TEXT,
        available_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_import_tasks_claim ON import_tasks (status, available_at)",
    r#"
    CREATE TABLE IF NOT EXISTS surahs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        number INTEGER NOT NULL UNIQUE,
        name_arabic TEXT NOT NULL,
        name_english TEXT NOT NULL,
        audio_url TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS verses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        surah_id INTEGER NOT NULL REFERENCES surahs(id) ON DELETE CASCADE,
        number INTEGER NOT NULL,
        arabic_text TEXT NOT NULL,
        translation TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (surah_id, number)
    )
    "#,
];

/// Create a new database connection pool and initialize the schema.
///
/// # Arguments
/// * `database_url` - SQLite connection string, e.g. `sqlite://quran.db`
///
/// The database file is created if missing. WAL mode plus a busy timeout
/// keeps concurrent worker processes from failing on write contention.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create a pool from DATABASE_URL environment variable
pub async fn create_pool_from_env() -> Result<DbPool> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| crate::error::ImportError::ConfigError("DATABASE_URL not set".to_string()))?;

    create_pool(&database_url).await
}

/// Create the tables and indexes if they do not exist yet
pub async fn init_schema(pool: &DbPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_creation_initializes_schema() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should connect");
        init_schema(&pool).await.expect("schema should initialize");
        // Re-running must be a no-op
        init_schema(&pool).await.expect("schema re-init should be a no-op");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_tasks")
            .fetch_one(&pool)
            .await
            .expect("import_tasks should exist");
        assert_eq!(count, 0);
    }
}
