//! Read-only progress reporting over the queue and the destination tables
//!
//! Safe to run at any time while workers are active; nothing here mutates.

use crate::db::models::{ImportTask, StatusCounts};
use crate::db::{surahs, tasks, verses, DbPool};
use crate::error::Result;

/// Snapshot of import progress
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub tasks: StatusCounts,
    pub surah_count: i64,
    pub verse_count: i64,
    /// Populated only when failure details were requested
    pub failed_tasks: Vec<ImportTask>,
}

/// Gather queue depth, destination counts, and optionally the failed tasks
pub async fn gather_report(pool: &DbPool, include_failed: bool) -> Result<ImportReport> {
    let task_counts = tasks::count_tasks_by_status(pool).await?;
    let surah_count = surahs::count_surahs(pool).await?;
    let verse_count = verses::count_verses(pool).await?;

    let failed_tasks = if include_failed {
        tasks::list_failed_tasks(pool).await?
    } else {
        Vec::new()
    };

    Ok(ImportReport {
        tasks: task_counts,
        surah_count,
        verse_count,
        failed_tasks,
    })
}

impl ImportReport {
    /// Render the report as CLI output
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Queue: {} pending, {} in progress, {} done, {} failed\n",
            self.tasks.pending, self.tasks.in_progress, self.tasks.done, self.tasks.failed
        ));
        out.push_str(&format!(
            "Imported: {} surahs, {} verses\n",
            self.surah_count, self.verse_count
        ));

        if !self.failed_tasks.is_empty() {
            out.push_str("\nFailed tasks:\n");
            for task in &self.failed_tasks {
                out.push_str(&format!(
                    "  task {} (surah {}), attempts {}/{}: {}\n",
                    task.id,
                    task.payload.number,
                    task.attempts,
                    task.max_attempts,
                    task.last_error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SurahPayload;
    use sqlx::types::Json;

    #[test]
    fn render_shows_counts_and_failures() {
        let report = ImportReport {
            tasks: StatusCounts {
                pending: 0,
                in_progress: 1,
                done: 2,
                failed: 1,
            },
            surah_count: 2,
            verse_count: 13,
            failed_tasks: vec![ImportTask {
                id: 7,
                payload: Json(SurahPayload {
                    number: 3,
                    name_arabic: "آل عمران".to_string(),
                    name_english: "Ali 'Imran".to_string(),
                    audio_url: "https://audio.example.com/3.mp3".to_string(),
                    verses: vec![],
                }),
                status: "failed".to_string(),
                attempts: 3,
                max_attempts: 3,
                claimed_by: None,
                last_error: Some("HTTP error 404 for URL: https://audio.example.com/3.mp3".to_string()),
                available_at: 0,
                created_at: 0,
                updated_at: 0,
            }],
        };

        let rendered = report.render();
        assert!(rendered.contains("0 pending, 1 in progress, 2 done, 1 failed"));
        assert!(rendered.contains("2 surahs, 13 verses"));
        assert!(rendered.contains("task 7 (surah 3), attempts 3/3"));
        assert!(rendered.contains("HTTP error 404"));
    }

    #[test]
    fn render_omits_failure_section_when_empty() {
        let report = ImportReport {
            tasks: StatusCounts::default(),
            surah_count: 0,
            verse_count: 0,
            failed_tasks: vec![],
        };

        assert!(!report.render().contains("Failed tasks"));
    }
}
