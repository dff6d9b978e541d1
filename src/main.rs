//! Quran Importer CLI
//!
//! A command-line tool for importing Quran surah and verse data.
//! Supports dispatch mode (enqueue tasks from a dataset file), worker mode
//! (claim and execute tasks until terminated), and a read-only monitor.

use anyhow::Result;
use clap::{Parser, Subcommand};
use quran_importer::db::create_pool_from_env;
use quran_importer::monitor::gather_report;
use quran_importer::worker::{
    run_workers, setup_signal_handler, TaskExecutor, TaskRunner, WorkerConfig,
};
use quran_importer::{
    dispatch_dataset, AudioFetcher, FsObjectStore, HttpAudioFetcher, ObjectStore, QuranDataset,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "quran-importer")]
#[command(about = "Import Quran surahs and verses through a durable task queue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the dataset file and enqueue one import task per surah
    Dispatch {
        /// Path to the dataset JSON file
        #[arg(short, long, default_value = "quran.json")]
        file: PathBuf,

        /// Maximum execution attempts per task before it fails permanently
        #[arg(long, default_value = "3")]
        tries: i64,
    },

    /// Run as worker, claiming and executing import tasks until terminated
    Worker {
        /// Poll interval in seconds when no tasks are due (default: 5)
        #[arg(short, long, default_value = "5")]
        poll_interval: u64,

        /// Task timeout in seconds; also the claim lease (default: 120)
        #[arg(short, long, default_value = "120")]
        timeout: u64,

        /// Delay in seconds before a failed task is retried (default: 30)
        #[arg(long, default_value = "30")]
        retry_delay: u64,

        /// Number of concurrent runner loops (default: 5)
        #[arg(short, long, default_value = "5")]
        concurrency: usize,

        /// Process at most one task and exit (for testing)
        #[arg(long)]
        once: bool,
    },

    /// Report task counts and import progress
    Monitor {
        /// Include details for permanently failed tasks
        #[arg(long)]
        failed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Dispatch { file, tries } => {
            // Load .env file if present
            dotenvy::dotenv().ok();

            info!("Loading dataset from {}", file.display());
            let dataset = QuranDataset::load(&file).await?;

            let pool = create_pool_from_env().await?;
            let count = dispatch_dataset(&pool, &dataset, tries).await?;

            println!("Dispatched {} import tasks to the queue", count);
        }

        Commands::Worker {
            poll_interval,
            timeout,
            retry_delay,
            concurrency,
            once,
        } => {
            // Load .env file if present
            dotenvy::dotenv().ok();

            info!("Initializing worker...");

            // Create database pool
            let pool = create_pool_from_env().await?;
            info!("Database connection established");

            // Build worker config
            let config = WorkerConfig::builder()
                .poll_interval_secs(poll_interval)
                .task_timeout(Duration::from_secs(timeout))
                .retry_delay_secs(retry_delay)
                .concurrency(concurrency)
                .build();

            // Wire the executor to the real fetcher and object store
            let fetcher: Arc<dyn AudioFetcher> = Arc::new(HttpAudioFetcher::new()?);
            let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::from_env()?);
            let executor = Arc::new(TaskExecutor::new(fetcher, store));

            if once {
                // Run once mode
                info!("Running in single-task mode...");
                let worker_id = format!("worker-{}-0", std::process::id());
                let runner = TaskRunner::new(pool, config, executor, worker_id);
                match runner.run_once().await {
                    Ok(true) => {
                        println!("Task processed");
                    }
                    Ok(false) => {
                        println!("No due tasks found");
                    }
                    Err(e) => {
                        eprintln!("Error processing task: {}", e);
                        return Err(e.into());
                    }
                }
            } else {
                // Setup graceful shutdown shared by all runner loops
                let shutdown = Arc::new(AtomicBool::new(false));
                setup_signal_handler(Arc::clone(&shutdown));

                run_workers(pool, config, executor, shutdown).await?;
            }
        }

        Commands::Monitor { failed } => {
            // Load .env file if present
            dotenvy::dotenv().ok();

            let pool = create_pool_from_env().await?;
            let report = gather_report(&pool, failed).await?;

            print!("{}", report.render());
        }
    }

    Ok(())
}
