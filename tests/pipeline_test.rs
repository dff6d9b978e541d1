//! End-to-end pipeline: dispatch a dataset, drain it with competing
//! runners, and check the final queue and destination state.

use async_trait::async_trait;
use quran_importer::dataset::{QuranDataset, SurahPayload, VersePayload};
use quran_importer::db::{init_schema, DbPool};
use quran_importer::error::{ImportError, Result};
use quran_importer::monitor::gather_report;
use quran_importer::worker::{TaskExecutor, TaskRunner, WorkerConfig};
use quran_importer::{dispatch_dataset, AudioFetcher, ObjectStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn memory_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");
    init_schema(&pool).await.expect("schema should initialize");
    pool
}

fn surah(number: i64, verse_count: i64) -> SurahPayload {
    let verses = (1..=verse_count)
        .map(|v| VersePayload {
            number: v,
            arabic_text: format!("آية {}", v),
            translation: format!("verse {}", v),
        })
        .collect();
    SurahPayload {
        number,
        name_arabic: format!("سورة {}", number),
        name_english: format!("Surah {}", number),
        audio_url: format!("https://audio.example.com/surah/{}.mp3", number),
        verses,
    }
}

/// Serves bytes for every URL except the ones configured to 404
struct RoutedFetcher {
    missing: HashSet<String>,
}

#[async_trait]
impl AudioFetcher for RoutedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if self.missing.contains(url) {
            return Err(ImportError::HttpStatusError {
                url: url.to_string(),
                status: 404,
            });
        }
        Ok(b"audio".to_vec())
    }
}

#[derive(Default)]
struct MemoryStore {
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, _data: &[u8]) -> Result<String> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("https://cdn.test/{}", key))
    }
}

fn drain_config() -> WorkerConfig {
    // Zero retry delay so failed tasks are immediately claimable again and
    // the queue drains without sleeping through backoff windows
    WorkerConfig::builder()
        .poll_interval(Duration::from_millis(10))
        .task_timeout(Duration::from_secs(30))
        .retry_delay(Duration::from_secs(0))
        .build()
}

/// Alternate between the runners until neither finds a due task
async fn drain(runners: &[TaskRunner]) {
    for _ in 0..50 {
        let mut processed_any = false;
        for runner in runners {
            if runner.process_one_task().await.unwrap_or(false) {
                processed_any = true;
            }
        }
        if !processed_any {
            return;
        }
    }
    panic!("queue did not drain within 50 iterations");
}

#[tokio::test]
async fn three_surahs_with_one_unfetchable_audio() {
    let pool = memory_pool().await;

    let dataset = QuranDataset {
        surahs: vec![surah(1, 7), surah(2, 6), surah(3, 5)],
    };
    let enqueued = dispatch_dataset(&pool, &dataset, 3).await.unwrap();
    assert_eq!(enqueued, 3);

    let fetcher = Arc::new(RoutedFetcher {
        missing: HashSet::from(["https://audio.example.com/surah/3.mp3".to_string()]),
    });
    let store = Arc::new(MemoryStore::default());
    let executor = Arc::new(TaskExecutor::new(fetcher, store.clone()));

    let config = drain_config();
    let runners = vec![
        TaskRunner::new(pool.clone(), config.clone(), Arc::clone(&executor), "worker-a".to_string()),
        TaskRunner::new(pool.clone(), config.clone(), Arc::clone(&executor), "worker-b".to_string()),
    ];
    drain(&runners).await;

    let report = gather_report(&pool, true).await.unwrap();
    assert_eq!(report.tasks.pending, 0);
    assert_eq!(report.tasks.in_progress, 0);
    assert_eq!(report.tasks.done, 2);
    assert_eq!(report.tasks.failed, 1);

    // Destination has exactly the two fetchable surahs
    assert_eq!(report.surah_count, 2);
    assert_eq!(report.verse_count, 7 + 6);

    // The unfetchable surah burned all its attempts and kept its error
    assert_eq!(report.failed_tasks.len(), 1);
    let failed = &report.failed_tasks[0];
    assert_eq!(failed.payload.number, 3);
    assert_eq!(failed.attempts, 3);
    assert_eq!(failed.max_attempts, 3);
    assert!(failed.last_error.as_deref().unwrap_or("").contains("404"));

    // One upload per successful surah
    let mut keys = store.keys.lock().unwrap().clone();
    keys.sort();
    assert_eq!(keys, ["audio/surah_1.mp3", "audio/surah_2.mp3"]);
}

#[tokio::test]
async fn duplicate_dispatch_settles_to_a_single_import() {
    let pool = memory_pool().await;

    let dataset = QuranDataset {
        surahs: vec![surah(1, 4), surah(2, 3)],
    };
    dispatch_dataset(&pool, &dataset, 3).await.unwrap();
    dispatch_dataset(&pool, &dataset, 3).await.unwrap();

    let fetcher = Arc::new(RoutedFetcher {
        missing: HashSet::new(),
    });
    let store = Arc::new(MemoryStore::default());
    let executor = Arc::new(TaskExecutor::new(fetcher, store));

    let runners = vec![TaskRunner::new(
        pool.clone(),
        drain_config(),
        executor,
        "worker-a".to_string(),
    )];
    drain(&runners).await;

    let report = gather_report(&pool, false).await.unwrap();
    // All four tasks finish: two import, two hit the idempotency guard
    assert_eq!(report.tasks.done, 4);
    assert_eq!(report.tasks.failed, 0);
    assert_eq!(report.surah_count, 2);
    assert_eq!(report.verse_count, 4 + 3);
}

#[tokio::test]
async fn dataset_file_loads_and_dispatches() {
    let pool = memory_pool().await;

    let dataset = QuranDataset {
        surahs: vec![surah(1, 2)],
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quran.json");
    std::fs::write(&path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();

    let loaded = QuranDataset::load(&path).await.unwrap();
    let enqueued = dispatch_dataset(&pool, &loaded, 3).await.unwrap();
    assert_eq!(enqueued, 1);
}

#[tokio::test]
async fn run_loop_stops_on_shutdown_signal() {
    let pool = memory_pool().await;
    let fetcher = Arc::new(RoutedFetcher {
        missing: HashSet::new(),
    });
    let executor = Arc::new(TaskExecutor::new(fetcher, Arc::new(MemoryStore::default())));

    let config = WorkerConfig::builder()
        .poll_interval(Duration::from_millis(10))
        .build();
    let runner = TaskRunner::new(pool, config, executor, "worker-a".to_string());
    let shutdown = runner.shutdown_handle();

    let handle = tokio::spawn(async move { runner.run().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.store(true, Ordering::Relaxed);

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker should stop after shutdown is signaled")
        .expect("worker task should not panic");
    assert!(result.is_ok());
}
