//! Quran Importer - A Rust service for importing Quran data through a durable task queue
//!
//! The importer reads a JSON dataset of surahs, enqueues one durable task
//! per surah, and runs competing workers that claim tasks atomically,
//! download each surah's audio recording, upload it to an object store, and
//! write the surah row plus its full verse set in a single transaction.
//!
//! Tasks are retried with backoff on failure and reclaimed by lease expiry
//! if their worker dies; an idempotency guard in the executor makes
//! duplicate or retried tasks safe.

pub mod dataset;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod monitor;
pub mod storage;
pub mod worker;

pub use dataset::{QuranDataset, SurahPayload, VersePayload};
pub use dispatcher::dispatch_dataset;
pub use error::{ImportError, Result};
pub use fetcher::{AudioFetcher, FetcherConfig, HttpAudioFetcher};
pub use monitor::{gather_report, ImportReport};
pub use storage::{audio_key, FsObjectStore, ObjectStore};
