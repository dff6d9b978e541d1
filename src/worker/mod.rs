//! Worker module for polling and processing import_tasks
//!
//! This module provides:
//! - TaskRunner: Main worker loop that claims due tasks and reports outcomes
//! - TaskExecutor: Imports one surah (guard, fetch, upload, persist)
//! - WorkerConfig: Configuration for the worker

pub mod config;
pub mod executor;
pub mod runner;

pub use config::WorkerConfig;
pub use executor::{ExecutionOutcome, TaskExecutor};
pub use runner::{run_workers, setup_signal_handler, TaskRunner};
