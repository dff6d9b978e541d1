//! Surahs database operations

use crate::db::models::{NewSurah, Surah};
use crate::db::{unix_now, DbPool};
use crate::error::Result;
use sqlx::{Sqlite, Transaction};

/// Get a surah by its number (the natural key)
pub async fn find_surah_by_number(pool: &DbPool, number: i64) -> Result<Option<Surah>> {
    let surah = sqlx::query_as::<_, Surah>("SELECT * FROM surahs WHERE number = ?1")
        .bind(number)
        .fetch_optional(pool)
        .await?;

    Ok(surah)
}

/// Insert a surah inside a caller-owned transaction.
///
/// The UNIQUE constraint on `number` is the backstop against two workers
/// racing duplicate-dispatched tasks past the idempotency check.
pub async fn insert_surah(tx: &mut Transaction<'_, Sqlite>, surah: &NewSurah) -> Result<Surah> {
    let row = sqlx::query_as::<_, Surah>(
        r#"
        INSERT INTO surahs (number, name_arabic, name_english, audio_url, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(surah.number)
    .bind(&surah.name_arabic)
    .bind(&surah.name_english)
    .bind(&surah.audio_url)
    .bind(unix_now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Count surah rows, for monitoring
pub async fn count_surahs(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM surahs")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
