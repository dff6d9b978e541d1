//! Dataset dispatch: validate once, enqueue one task per surah
//!
//! Dispatch never waits for completion and never deduplicates. Re-running
//! it over the same dataset enqueues a second round of tasks; the
//! executor's idempotency guard turns those into no-ops at execution time.

use crate::dataset::QuranDataset;
use crate::db::{tasks, DbPool};
use crate::error::Result;
use tracing::{debug, info};

/// Validate the dataset and enqueue one pending task per surah, in input
/// order. Returns the number of tasks enqueued.
pub async fn dispatch_dataset(
    pool: &DbPool,
    dataset: &QuranDataset,
    max_attempts: i64,
) -> Result<u64> {
    dataset.validate()?;

    info!("Dispatching {} import tasks to queue...", dataset.surahs.len());

    let mut enqueued = 0u64;
    for payload in &dataset.surahs {
        let task = tasks::enqueue_task(pool, payload, max_attempts).await?;
        debug!("Enqueued task {} for surah {}", task.id, payload.number);
        enqueued += 1;
    }

    Ok(enqueued)
}

#[cfg(test)]
mod tests {
    // Dispatch state (pending status, zero attempts, input order) is
    // covered in tests/queue_test.rs.
}
