//! Audio asset fetching
//!
//! One fetch attempt per task execution. Retrying is the queue's job: a
//! failed fetch fails the task, and the queue reschedules it with backoff,
//! so an inner retry loop here would multiply the attempt count.

use crate::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Configuration for the audio fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Request timeout (default: 60 seconds; audio files are large)
    pub request_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Fetch capability consumed by the task executor
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download the asset at `url`, returning its raw bytes
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP fetcher for audio recordings
pub struct HttpAudioFetcher {
    client: Client,
}

impl HttpAudioFetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ImportError::FetchError {
                url: "client_init".to_string(),
                source: e,
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AudioFetcher for HttpAudioFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImportError::FetchError {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImportError::FetchError {
                url: url.to_string(),
                source: e,
            })?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
