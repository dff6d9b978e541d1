//! Input dataset structures and dispatch-time validation
//!
//! The importer consumes a JSON document enumerating surahs, each with its
//! ordered verses and one downloadable audio source. Entries are validated
//! here, before enqueue, so malformed data is rejected up front instead of
//! failing deep inside a worker.

use crate::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// A single verse belonging to a surah
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersePayload {
    /// Verse number, unique within its surah
    pub number: i64,
    /// Arabic text
    pub arabic_text: String,
    /// Translation text
    pub translation: String,
}

/// One surah's full import payload: the unit of work for a single task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurahPayload {
    /// Surah number, the natural key (positive, unique in the dataset)
    pub number: i64,
    /// Arabic name
    pub name_arabic: String,
    /// English name
    pub name_english: String,
    /// Source URL for the audio recording
    pub audio_url: String,
    /// Ordered verse records
    pub verses: Vec<VersePayload>,
}

/// The full input dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranDataset {
    pub surahs: Vec<SurahPayload>,
}

impl SurahPayload {
    /// Validate a single surah entry.
    ///
    /// Requires a positive number, non-empty names, an http(s) audio URL,
    /// and a non-empty verse list with strictly ascending positive numbers
    /// and non-empty Arabic text.
    pub fn validate(&self) -> Result<()> {
        if self.number <= 0 {
            return Err(ImportError::InvalidPayload(format!(
                "surah number must be positive, got {}",
                self.number
            )));
        }
        if self.name_arabic.trim().is_empty() || self.name_english.trim().is_empty() {
            return Err(ImportError::InvalidPayload(format!(
                "surah {} has an empty name",
                self.number
            )));
        }

        let url = Url::parse(&self.audio_url).map_err(|e| {
            ImportError::InvalidPayload(format!(
                "surah {} has an invalid audio_url: {}",
                self.number, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ImportError::InvalidPayload(format!(
                "surah {} audio_url must be http(s), got scheme '{}'",
                self.number,
                url.scheme()
            )));
        }

        if self.verses.is_empty() {
            return Err(ImportError::InvalidPayload(format!(
                "surah {} has no verses",
                self.number
            )));
        }
        let mut previous = 0;
        for verse in &self.verses {
            if verse.number <= previous {
                return Err(ImportError::InvalidPayload(format!(
                    "surah {} verse numbers must be strictly ascending (saw {} after {})",
                    self.number, verse.number, previous
                )));
            }
            if verse.arabic_text.trim().is_empty() {
                return Err(ImportError::InvalidPayload(format!(
                    "surah {} verse {} has empty text",
                    self.number, verse.number
                )));
            }
            previous = verse.number;
        }

        Ok(())
    }
}

impl QuranDataset {
    /// Load a dataset from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let dataset: QuranDataset = serde_json::from_str(&raw)?;
        Ok(dataset)
    }

    /// Validate the whole dataset: non-empty, every entry well-formed,
    /// surah numbers unique.
    pub fn validate(&self) -> Result<()> {
        if self.surahs.is_empty() {
            return Err(ImportError::InvalidDataset(
                "dataset contains no surahs".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for surah in &self.surahs {
            surah.validate()?;
            if !seen.insert(surah.number) {
                return Err(ImportError::InvalidDataset(format!(
                    "duplicate surah number {}",
                    surah.number
                )));
            }
        }

        Ok(())
    }
}
