//! Job handler trait and execution contract.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use tome_core::{Error, Job, JobType, Result};

/// Context provided to job handlers.
pub struct JobContext {
    /// The job being processed.
    pub job: Job,
}

impl JobContext {
    /// Create a new job context.
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    /// The book this job concerns, if any.
    pub fn book_id(&self) -> Option<i64> {
        self.job.book_id
    }

    /// Deserialize the job payload into a typed value.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .job
            .payload
            .as_ref()
            .ok_or_else(|| Error::Job("Job has no payload".to_string()))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| Error::Job(format!("Malformed job payload: {}", e)))
    }
}

/// Result of job execution.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed successfully.
    Success,
    /// Job failed with an error message. The queue consults `max_retries`
    /// to decide between re-queueing and terminal failure.
    Failed(String),
}

/// Trait for job handlers.
///
/// A handler owns all domain side effects for its job type, including any
/// durable error marking. By the time `execute` returns, the domain state
/// must be final either way; the worker only updates queue bookkeeping.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler processes.
    fn job_type(&self) -> JobType;

    /// Execute the job.
    async fn execute(&self, ctx: JobContext) -> JobResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tome_core::{models::SummarizeJobPayload, JobStatus};
    use uuid::Uuid;

    fn job_with_payload(payload: Option<serde_json::Value>) -> Job {
        Job {
            id: Uuid::new_v4(),
            book_id: Some(7),
            job_type: JobType::SummarizeUpload,
            status: JobStatus::Running,
            priority: 5,
            payload,
            error_message: None,
            retry_count: 0,
            max_retries: 0,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    #[test]
    fn test_context_typed_payload() {
        let ctx = JobContext::new(job_with_payload(Some(serde_json::json!({
            "book_id": 7,
            "scratch_path": "/tmp/upload.pdf",
            "quick": true,
        }))));
        let payload: SummarizeJobPayload = ctx.payload().unwrap();
        assert_eq!(payload.book_id, 7);
        assert!(payload.quick);
        assert_eq!(ctx.book_id(), Some(7));
    }

    #[test]
    fn test_context_missing_payload_is_job_error() {
        let ctx = JobContext::new(job_with_payload(None));
        let err = ctx.payload::<SummarizeJobPayload>().unwrap_err();
        assert!(matches!(err, Error::Job(_)));
    }

    #[test]
    fn test_context_malformed_payload_is_job_error() {
        let ctx = JobContext::new(job_with_payload(Some(serde_json::json!({"nope": 1}))));
        let err = ctx.payload::<SummarizeJobPayload>().unwrap_err();
        assert!(matches!(err, Error::Job(_)));
    }
}
