//! Database models for the task queue and the destination tables
//!
//! Timestamps are stored as unix epoch seconds (INTEGER columns) so that
//! `available_at <= now` comparisons in SQL are plain integer comparisons.

use crate::dataset::SurahPayload;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// ============================================================================
// Import Tasks
// ============================================================================

/// ImportTask - Matches import_tasks table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ImportTask {
    pub id: i64,
    pub payload: Json<SurahPayload>,
    pub status: String,
    pub attempts: i64,
    pub max_attempts: i64,
    pub claimed_by: Option<String>,
    pub last_error: Option<String>,
    /// Claimable once this passes: enqueue time for fresh tasks, retry time
    /// for rescheduled ones, lease expiry while in progress
    pub available_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Task counts per status, for monitoring
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
    pub failed: i64,
}

// ============================================================================
// Surahs
// ============================================================================

/// Surah - Matches surahs table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Surah {
    pub id: i64,
    pub number: i64,
    pub name_arabic: String,
    pub name_english: String,
    /// Durable object-store reference, not the source URL from the payload
    pub audio_url: String,
    pub created_at: i64,
}

/// NewSurah - For inserting new surahs
#[derive(Debug, Clone, Serialize)]
pub struct NewSurah {
    pub number: i64,
    pub name_arabic: String,
    pub name_english: String,
    pub audio_url: String,
}

// ============================================================================
// Verses
// ============================================================================

/// Verse - Matches verses table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Verse {
    pub id: i64,
    pub surah_id: i64,
    pub number: i64,
    pub arabic_text: String,
    pub translation: String,
    pub created_at: i64,
}
