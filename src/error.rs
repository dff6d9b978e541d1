//! Error types for quran-importer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to fetch URL: {url}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for URL: {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Object store error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("File system error")]
    FsError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Task timeout")]
    TaskTimeout,
}

pub type Result<T> = std::result::Result<T, ImportError>;
