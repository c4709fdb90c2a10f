//! Core data models shared across the tome crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults::SUMMARY_SENTINEL;

// =============================================================================
// BOOKS
// =============================================================================

/// A catalog record for a single book.
///
/// The `summary` column doubles as pipeline state: while the background
/// summarization job is in flight it holds [`SUMMARY_SENTINEL`]; any other
/// value (including `None` or an empty string) means the record is
/// finalized. A book row is visible to readers the instant the intake
/// insert commits, before the pipeline has run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: i32,
    pub summary: Option<String>,
}

impl Book {
    /// True iff the summary is present, non-empty after trimming, and not
    /// (case-insensitively) the in-flight sentinel.
    pub fn summary_ready(&self) -> bool {
        summary_is_ready(self.summary.as_deref())
    }
}

/// Sentinel-aware readiness check for a summary field.
///
/// Comparison with the sentinel is whitespace-trimmed and case-insensitive,
/// so `" GENERATING... "` still reads as in-flight.
pub fn summary_is_ready(summary: Option<&str>) -> bool {
    match summary {
        None => false,
        Some(s) => {
            let trimmed = s.trim();
            !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(SUMMARY_SENTINEL)
        }
    }
}

/// Fields supplied when creating a book record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: i32,
    /// Initial summary value. Intake sets the sentinel here.
    pub summary: Option<String>,
}

// =============================================================================
// REVIEWS
// =============================================================================

/// A user review of a book. `book_id` is a required foreign key: reviews
/// against a missing book are rejected with NotFound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub user_id: String,
    pub review_text: String,
    pub rating: i32,
}

/// Fields supplied when posting a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub review_text: String,
    pub rating: i32,
}

// =============================================================================
// USERS & PREFERENCES
// =============================================================================

/// A registered user. The preference tuple is embedded: one set per user,
/// overwritten on each save, no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub pref_genre: Option<String>,
    pub pref_author: Option<String>,
    pub pref_min_year: Option<i32>,
    pub pref_max_year: Option<i32>,
}

impl User {
    /// The user's saved preference tuple, or None if nothing is saved yet.
    pub fn preferences(&self) -> Option<UserPreferences> {
        if self.pref_genre.is_none()
            && self.pref_author.is_none()
            && self.pref_min_year.is_none()
            && self.pref_max_year.is_none()
        {
            return None;
        }
        Some(UserPreferences {
            genre: self.pref_genre.clone(),
            author: self.pref_author.clone(),
            min_year: self.pref_min_year,
            max_year: self.pref_max_year,
        })
    }
}

/// A user's recommendation preference tuple. All fields optional; unset
/// fields simply contribute nothing to match scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPreferences {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// A matched book annotated with its rule-based rating and confidence label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedBook {
    pub title: String,
    pub author: String,
    pub year_published: i32,
    pub summary: Option<String>,
    /// Match score scaled to a 0-5 rating, rounded to one decimal.
    pub rating: f64,
    /// "High" (score >= 0.8), "Medium" (>= 0.5), or "Low".
    pub confidence: String,
}

// =============================================================================
// JOBS
// =============================================================================

/// Background job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Summarize an uploaded document and finalize the book's summary.
    SummarizeUpload,
}

impl JobType {
    /// Default queue priority for this job type.
    pub fn default_priority(&self) -> i32 {
        match self {
            JobType::SummarizeUpload => 5,
        }
    }
}

/// Background job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A background job row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub book_id: Option<i64>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub priority: i32,
    pub payload: Option<JsonValue>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload carried by a `summarize_upload` job. Produced by upload intake,
/// consumed by the pipeline handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeJobPayload {
    pub book_id: i64,
    pub scratch_path: String,
    #[serde(default)]
    pub quick: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(summary: Option<&str>) -> Book {
        Book {
            id: 1,
            title: "Test".to_string(),
            author: "Author".to_string(),
            genre: "Fiction".to_string(),
            year_published: 2021,
            summary: summary.map(String::from),
        }
    }

    #[test]
    fn test_summary_ready_none() {
        assert!(!book(None).summary_ready());
    }

    #[test]
    fn test_summary_ready_empty() {
        assert!(!book(Some("")).summary_ready());
        assert!(!book(Some("   ")).summary_ready());
    }

    #[test]
    fn test_summary_ready_sentinel_exact() {
        assert!(!book(Some("Generating...")).summary_ready());
    }

    #[test]
    fn test_summary_ready_sentinel_case_insensitive() {
        assert!(!book(Some("GENERATING...")).summary_ready());
        assert!(!book(Some("generating...")).summary_ready());
    }

    #[test]
    fn test_summary_ready_sentinel_whitespace_trimmed() {
        assert!(!book(Some(" Generating... ")).summary_ready());
        assert!(!book(Some("\tGENERATING...\n")).summary_ready());
    }

    #[test]
    fn test_summary_ready_real_text() {
        assert!(book(Some("A tale of two cities.")).summary_ready());
    }

    #[test]
    fn test_summary_ready_error_marker_counts_as_final() {
        // The error marker is a terminal state: status must not report
        // in-flight forever after a pipeline failure.
        assert!(book(Some(crate::defaults::SUMMARY_ERROR_MARKER)).summary_ready());
    }

    #[test]
    fn test_preferences_none_when_all_unset() {
        let user = User {
            username: "u".to_string(),
            password_hash: "h".to_string(),
            pref_genre: None,
            pref_author: None,
            pref_min_year: None,
            pref_max_year: None,
        };
        assert!(user.preferences().is_none());
    }

    #[test]
    fn test_preferences_partial_tuple() {
        let user = User {
            username: "u".to_string(),
            password_hash: "h".to_string(),
            pref_genre: Some("Fantasy".to_string()),
            pref_author: None,
            pref_min_year: Some(1990),
            pref_max_year: None,
        };
        let prefs = user.preferences().unwrap();
        assert_eq!(prefs.genre.as_deref(), Some("Fantasy"));
        assert!(prefs.author.is_none());
        assert_eq!(prefs.min_year, Some(1990));
    }

    #[test]
    fn test_summarize_payload_round_trip() {
        let payload = SummarizeJobPayload {
            book_id: 42,
            scratch_path: "/tmp/tome/upload-42.bin".to_string(),
            quick: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        let back: SummarizeJobPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_summarize_payload_quick_defaults_false() {
        let back: SummarizeJobPayload =
            serde_json::from_value(serde_json::json!({"book_id": 1, "scratch_path": "/tmp/x"}))
                .unwrap();
        assert!(!back.quick);
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User {
            username: "alice".to_string(),
            password_hash: "secret-hash".to_string(),
            pref_genre: None,
            pref_author: None,
            pref_min_year: None,
            pref_max_year: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
