//! Task runner - main worker loop

use crate::db::models::TaskStatus;
use crate::db::{tasks, DbPool};
use crate::error::{ImportError, Result};
use crate::worker::{TaskExecutor, WorkerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Task runner that polls and processes import_tasks
pub struct TaskRunner {
    pool: DbPool,
    config: WorkerConfig,
    executor: Arc<TaskExecutor>,
    worker_id: String,
    shutdown: Arc<AtomicBool>,
}

impl TaskRunner {
    /// Create a new task runner.
    ///
    /// `worker_id` must be unique among live workers; it is stamped into
    /// `claimed_by` on every claim and checked on every outcome report.
    pub fn new(
        pool: DbPool,
        config: WorkerConfig,
        executor: Arc<TaskExecutor>,
        worker_id: String,
    ) -> Self {
        Self {
            pool,
            config,
            executor,
            worker_id,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a shutdown flag with other runners
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Get a handle to signal shutdown
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Main worker loop
    ///
    /// Polls for due tasks and processes them until shutdown is signaled.
    /// Task failures become queue transitions, never loop exits.
    pub async fn run(&self) -> Result<()> {
        info!("Starting import worker {}...", self.worker_id);
        info!("Poll interval: {:?}", self.config.poll_interval);
        info!("Task timeout: {:?}", self.config.task_timeout);
        info!("Retry delay: {:?}", self.config.retry_delay);

        loop {
            // Check for shutdown signal
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown signal received, stopping worker {}...", self.worker_id);
                break;
            }

            match self.process_one_task().await {
                Ok(true) => {
                    // Task processed, continue immediately
                }
                Ok(false) => {
                    // No tasks available, wait before polling
                    debug!(
                        "Worker {} found no due tasks, sleeping for {:?}",
                        self.worker_id, self.config.poll_interval
                    );
                    sleep(self.config.poll_interval).await;
                }
                Err(e) => {
                    error!("Worker {} error: {}", self.worker_id, e);
                    // Wait a bit before retrying after error
                    sleep(Duration::from_secs(10)).await;
                }
            }
        }

        info!("Worker {} stopped", self.worker_id);
        Ok(())
    }

    /// Process a single task (useful for testing with --once flag)
    ///
    /// Returns:
    /// - Ok(true) if a task was claimed (whatever its outcome)
    /// - Ok(false) if no tasks were due
    /// - Err on error
    pub async fn process_one_task(&self) -> Result<bool> {
        // Atomically claim the next due task, leasing it for the timeout
        let lease_secs = self.config.task_timeout.as_secs() as i64;
        let task = match tasks::claim_next_task(&self.pool, &self.worker_id, lease_secs).await? {
            Some(t) => t,
            None => return Ok(false),
        };

        let task_id = task.id;
        let surah_number = task.payload.number;
        info!(
            "Worker {} claimed task {} (surah {}, attempt {} of {})",
            self.worker_id,
            task_id,
            surah_number,
            task.attempts + 1,
            task.max_attempts
        );

        // Execute with timeout
        let result = tokio::time::timeout(
            self.config.task_timeout,
            self.executor.execute(&self.pool, &task.payload),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => {
                info!("Task {} completed: {:?}", task_id, outcome);
                if !tasks::complete_task(&self.pool, task_id, &self.worker_id).await? {
                    warn!(
                        "Task {} was reclaimed before worker {} reported completion",
                        task_id, self.worker_id
                    );
                }
            }
            Ok(Err(e)) => {
                self.report_failure(task_id, surah_number, &e.to_string())
                    .await?;
            }
            Err(_) => {
                self.report_failure(task_id, surah_number, "Task timeout")
                    .await?;
                return Err(ImportError::TaskTimeout);
            }
        }

        Ok(true)
    }

    /// Run once and exit (for testing)
    pub async fn run_once(&self) -> Result<bool> {
        info!("Running worker in single-task mode...");
        self.process_one_task().await
    }

    /// Record a failed attempt and log what the queue decided to do
    async fn report_failure(&self, task_id: i64, surah_number: i64, error_msg: &str) -> Result<()> {
        let updated = tasks::fail_task(
            &self.pool,
            task_id,
            &self.worker_id,
            error_msg,
            self.config.retry_delay.as_secs() as i64,
        )
        .await?;

        match updated {
            Some(task) if task.status == TaskStatus::Failed.as_str() => {
                error!(
                    "Failed to import surah {}: {} (task {} gave up after {} attempts)",
                    surah_number, error_msg, task_id, task.attempts
                );
            }
            Some(task) => {
                warn!(
                    "Task {} (surah {}) failed: {} - rescheduled, attempt {} of {}",
                    task_id, surah_number, error_msg, task.attempts, task.max_attempts
                );
            }
            None => {
                warn!(
                    "Task {} was reclaimed before worker {} reported failure",
                    task_id, self.worker_id
                );
            }
        }

        Ok(())
    }
}

/// Spawn `config.concurrency` runners over one pool and wait for all of
/// them to observe the shared shutdown flag and exit.
pub async fn run_workers(
    pool: DbPool,
    config: WorkerConfig,
    executor: Arc<TaskExecutor>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let mut handles = Vec::with_capacity(config.concurrency);
    for index in 0..config.concurrency {
        let worker_id = format!("worker-{}-{}", std::process::id(), index);
        let runner = TaskRunner::new(
            pool.clone(),
            config.clone(),
            Arc::clone(&executor),
            worker_id,
        )
        .with_shutdown(Arc::clone(&shutdown));
        handles.push(tokio::spawn(async move { runner.run().await }));
    }

    for result in futures::future::join_all(handles).await {
        match result {
            Ok(run_result) => run_result?,
            Err(e) => error!("Worker task panicked: {}", e),
        }
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown
pub fn setup_signal_handler(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                shutdown.store(true, Ordering::Relaxed);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });
}
