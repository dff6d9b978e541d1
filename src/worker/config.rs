//! Worker configuration

use std::time::Duration;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Poll interval when no tasks available
    pub poll_interval: Duration,

    /// Per-task execution timeout; doubles as the claim lease duration,
    /// so a crashed worker's task becomes reclaimable once this elapses
    pub task_timeout: Duration,

    /// Delay before a failed task becomes claimable again
    pub retry_delay: Duration,

    /// Number of concurrent runner loops per worker process
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            task_timeout: Duration::from_secs(120),
            retry_delay: Duration::from_secs(30),
            concurrency: 5,
        }
    }
}

impl WorkerConfig {
    /// Create a new config builder
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }
}

/// Builder for WorkerConfig
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Set poll interval
    pub fn poll_interval(mut self, duration: Duration) -> Self {
        self.config.poll_interval = duration;
        self
    }

    /// Set poll interval in seconds
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval = Duration::from_secs(secs);
        self
    }

    /// Set task timeout
    pub fn task_timeout(mut self, duration: Duration) -> Self {
        self.config.task_timeout = duration;
        self
    }

    /// Set retry delay
    pub fn retry_delay(mut self, duration: Duration) -> Self {
        self.config.retry_delay = duration;
        self
    }

    /// Set retry delay in seconds
    pub fn retry_delay_secs(mut self, secs: u64) -> Self {
        self.config.retry_delay = Duration::from_secs(secs);
        self
    }

    /// Set the number of concurrent runner loops
    pub fn concurrency(mut self, count: usize) -> Self {
        self.config.concurrency = count.max(1);
        self
    }

    /// Build the config
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}

impl Default for WorkerConfigBuilder {
    fn default() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }
}
