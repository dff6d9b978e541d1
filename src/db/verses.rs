//! Verses database operations
//!
//! Verse rows only ever change as a full set under their surah, so every
//! mutation here runs on a caller-owned transaction.

use crate::dataset::VersePayload;
use crate::db::models::Verse;
use crate::db::{unix_now, DbPool};
use crate::error::Result;
use sqlx::{QueryBuilder, Sqlite, Transaction};

/// Insert all verses for a surah as a single multi-row INSERT.
///
/// One statement regardless of verse count: for a surah with V verses this
/// is one round trip, not V.
pub async fn insert_verses(
    tx: &mut Transaction<'_, Sqlite>,
    surah_id: i64,
    verses: &[VersePayload],
) -> Result<u64> {
    if verses.is_empty() {
        return Ok(0);
    }

    let now = unix_now();
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO verses (surah_id, number, arabic_text, translation, created_at) ",
    );
    builder.push_values(verses, |mut row, verse| {
        row.push_bind(surah_id)
            .push_bind(verse.number)
            .push_bind(&verse.arabic_text)
            .push_bind(&verse.translation)
            .push_bind(now);
    });

    let result = builder.build().execute(&mut **tx).await?;

    Ok(result.rows_affected())
}

/// Delete every verse belonging to a surah
pub async fn delete_verses_for_surah(
    tx: &mut Transaction<'_, Sqlite>,
    surah_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM verses WHERE surah_id = ?1")
        .bind(surah_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

/// Count verses belonging to one surah
pub async fn count_verses_for_surah(pool: &DbPool, surah_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verses WHERE surah_id = ?1")
        .bind(surah_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Count all verse rows, for monitoring
pub async fn count_verses(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verses")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// List a surah's verses in verse-number order
pub async fn list_verses_for_surah(pool: &DbPool, surah_id: i64) -> Result<Vec<Verse>> {
    let verses = sqlx::query_as::<_, Verse>(
        "SELECT * FROM verses WHERE surah_id = ?1 ORDER BY number ASC",
    )
    .bind(surah_id)
    .fetch_all(pool)
    .await?;

    Ok(verses)
}
