//! Object storage for imported audio assets
//!
//! The executor only needs one capability: store bytes under a key and get
//! back a durable reference URL. Keys are path-like strings and are derived
//! deterministically from the surah number, so repeated uploads of the same
//! surah overwrite in place instead of accumulating copies.

use crate::error::{ImportError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Deterministic object key for a surah's audio recording
pub fn audio_key(surah_number: i64) -> String {
    format!("audio/surah_{}.mp3", surah_number)
}

/// Write-side capability of the asset store.
///
/// The default implementation ([`FsObjectStore`]) maps keys to local
/// filesystem paths. Cloud backends implement the same trait.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob under `key`, overwriting any existing object, and
    /// return the public reference URL for it.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String>;
}

/// Filesystem-backed object store.
///
/// Key "audio/surah_1.mp3" lands at `{root}/audio/surah_1.mp3` and is
/// referenced as `{base_url}/audio/surah_1.mp3`. Parent directories are
/// created on demand.
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Build a store from OBJECT_STORE_ROOT and ASSET_BASE_URL
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("OBJECT_STORE_ROOT")
            .map_err(|_| ImportError::ConfigError("OBJECT_STORE_ROOT not set".to_string()))?;
        let base_url = std::env::var("ASSET_BASE_URL")
            .map_err(|_| ImportError::ConfigError("ASSET_BASE_URL not set".to_string()))?;
        Ok(Self::new(root, base_url))
    }

    /// Resolve a key to a path under the root. Rejects keys that escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
            return Err(ImportError::StorageError(format!(
                "invalid object key: {:?}",
                key
            )));
        }
        if Path::new(key)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(ImportError::StorageError(format!(
                "path traversal detected in key: {:?}",
                key
            )));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_key_is_deterministic() {
        assert_eq!(audio_key(1), "audio/surah_1.mp3");
        assert_eq!(audio_key(114), "audio/surah_114.mp3");
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_reference_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example.com/");

        let url = store.put("audio/surah_1.mp3", b"mp3 bytes").await.unwrap();
        assert_eq!(url, "https://cdn.example.com/audio/surah_1.mp3");

        let written = std::fs::read(dir.path().join("audio/surah_1.mp3")).unwrap();
        assert_eq!(written, b"mp3 bytes");
    }

    #[tokio::test]
    async fn put_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example.com");

        store.put("audio/surah_1.mp3", b"first").await.unwrap();
        let url = store.put("audio/surah_1.mp3", b"second").await.unwrap();
        assert_eq!(url, "https://cdn.example.com/audio/surah_1.mp3");

        let written = std::fs::read(dir.path().join("audio/surah_1.mp3")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example.com");

        assert!(store.put("../escape.mp3", b"x").await.is_err());
        assert!(store.put("/absolute.mp3", b"x").await.is_err());
        assert!(store.put("", b"x").await.is_err());
    }
}
