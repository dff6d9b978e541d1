//! Import task queue operations
//!
//! All worker coordination goes through this table. The claim is a single
//! conditional UPDATE, so competing workers on separate connections can
//! never both win the same task.

use crate::dataset::SurahPayload;
use crate::db::models::{ImportTask, StatusCounts};
use crate::db::{unix_now, DbPool};
use crate::error::Result;
use sqlx::types::Json;

/// Enqueue one pending task carrying a full surah payload.
///
/// No dedup is attempted here: re-dispatching the same dataset enqueues
/// duplicate tasks, and the executor's idempotency guard makes them no-ops.
pub async fn enqueue_task(
    pool: &DbPool,
    payload: &SurahPayload,
    max_attempts: i64,
) -> Result<ImportTask> {
    let now = unix_now();

    let task = sqlx::query_as::<_, ImportTask>(
        r#"
        INSERT INTO import_tasks
            (payload, status, attempts, max_attempts, available_at, created_at, updated_at)
        VALUES (?1, 'pending', 0, ?2, ?3, ?3, ?3)
        RETURNING *
        "#,
    )
    .bind(Json(payload))
    .bind(max_attempts)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Atomically claim the next due task and return it.
///
/// Due means `pending` with `available_at` in the past, or `in_progress`
/// with an expired lease (the owning worker crashed or timed out). The
/// winner is stamped with `claimed_by` and a fresh lease expiry of
/// `lease_secs` from now. Safe for concurrent workers: the UPDATE and its
/// candidate subquery execute as one atomic statement.
pub async fn claim_next_task(
    pool: &DbPool,
    worker_id: &str,
    lease_secs: i64,
) -> Result<Option<ImportTask>> {
    let now = unix_now();

    let task = sqlx::query_as::<_, ImportTask>(
        r#"
        UPDATE import_tasks
        SET status = 'in_progress',
            claimed_by = ?1,
            available_at = ?2,
            updated_at = ?3
        WHERE id = (
            SELECT id FROM import_tasks
            WHERE status IN ('pending', 'in_progress')
              AND available_at <= ?3
            ORDER BY created_at ASC, id ASC
            LIMIT 1
        )
        RETURNING *
        "#,
    )
    .bind(worker_id)
    .bind(now + lease_secs)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Mark a task done.
///
/// Guarded on `claimed_by`: a worker whose lease expired and whose task was
/// reclaimed by someone else gets `false` back and must not touch the task.
pub async fn complete_task(pool: &DbPool, task_id: i64, worker_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE import_tasks
        SET status = 'done',
            claimed_by = NULL,
            updated_at = ?3
        WHERE id = ?1
          AND status = 'in_progress'
          AND claimed_by = ?2
        "#,
    )
    .bind(task_id)
    .bind(worker_id)
    .bind(unix_now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Record a failed attempt.
///
/// Increments `attempts`, then either reschedules the task as `pending`
/// with `available_at` pushed `retry_delay_secs` into the future, or moves
/// it to terminal `failed` once the attempt ceiling is reached. The error
/// message is kept either way. Same `claimed_by` guard as [`complete_task`];
/// returns the updated row, or `None` for a stale owner.
pub async fn fail_task(
    pool: &DbPool,
    task_id: i64,
    worker_id: &str,
    error_msg: &str,
    retry_delay_secs: i64,
) -> Result<Option<ImportTask>> {
    let now = unix_now();

    let task = sqlx::query_as::<_, ImportTask>(
        r#"
        UPDATE import_tasks
        SET attempts = attempts + 1,
            status = CASE WHEN attempts + 1 >= max_attempts THEN 'failed' ELSE 'pending' END,
            claimed_by = NULL,
            last_error = ?3,
            available_at = ?4,
            updated_at = ?5
        WHERE id = ?1
          AND status = 'in_progress'
          AND claimed_by = ?2
        RETURNING *
        "#,
    )
    .bind(task_id)
    .bind(worker_id)
    .bind(error_msg)
    .bind(now + retry_delay_secs)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Get a task by ID
pub async fn get_task_by_id(pool: &DbPool, task_id: i64) -> Result<Option<ImportTask>> {
    let task = sqlx::query_as::<_, ImportTask>("SELECT * FROM import_tasks WHERE id = ?1")
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

    Ok(task)
}

/// Count tasks per status in one query, for monitoring
pub async fn count_tasks_by_status(pool: &DbPool) -> Result<StatusCounts> {
    let row: (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
            COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0) AS in_progress,
            COALESCE(SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END), 0) AS done,
            COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed
        FROM import_tasks
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(StatusCounts {
        pending: row.0,
        in_progress: row.1,
        done: row.2,
        failed: row.3,
    })
}

/// List terminally failed tasks with their recorded errors, oldest first
pub async fn list_failed_tasks(pool: &DbPool) -> Result<Vec<ImportTask>> {
    let tasks = sqlx::query_as::<_, ImportTask>(
        "SELECT * FROM import_tasks WHERE status = 'failed' ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}
