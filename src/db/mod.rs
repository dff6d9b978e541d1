//! Database module for quran-importer
//!
//! Provides SQLite operations for the import task queue and the destination
//! surah/verse tables.

pub mod connection;
pub mod models;
pub mod surahs;
pub mod tasks;
pub mod verses;

pub use connection::{create_pool, create_pool_from_env, init_schema, DbPool};
pub use models::*;

/// Current time as unix epoch seconds, the clock every queue column uses
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
