//! Job queue repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use tokio::sync::Notify;
use uuid::Uuid;

use tome_core::{new_v7, Error, Job, JobRepository, JobStatus, JobType, Result};

/// PostgreSQL implementation of JobRepository.
///
/// Claiming uses `FOR UPDATE SKIP LOCKED`, so multiple workers (or multiple
/// concurrent claims from one worker) never double-process a job.
pub struct PgJobRepository {
    pool: Pool<Postgres>,
    /// Notify handle for event-driven worker wake.
    notify: Arc<Notify>,
}

impl Clone for PgJobRepository {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            notify: self.notify.clone(),
        }
    }
}

impl PgJobRepository {
    /// Create a new PgJobRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Get the job notification handle for event-driven waking.
    pub fn job_notify(&self) -> Arc<Notify> {
        self.notify.clone()
    }

    /// Convert JobType to string for database.
    fn job_type_to_str(job_type: JobType) -> &'static str {
        match job_type {
            JobType::SummarizeUpload => "summarize_upload",
        }
    }

    /// Convert string from database to JobType.
    fn str_to_job_type(s: &str) -> JobType {
        match s {
            "summarize_upload" => JobType::SummarizeUpload,
            _ => JobType::SummarizeUpload, // single-type queue; fallback
        }
    }

    /// Convert string from database to JobStatus.
    fn str_to_job_status(s: &str) -> JobStatus {
        match s {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending, // fallback
        }
    }

    /// Parse a job row into a Job struct.
    fn parse_job_row(row: sqlx::postgres::PgRow) -> Job {
        Job {
            id: row.get("id"),
            book_id: row.get("book_id"),
            job_type: Self::str_to_job_type(row.get("job_type")),
            status: Self::str_to_job_status(row.get("status")),
            priority: row.get("priority"),
            payload: row.get("payload"),
            error_message: row.get("error_message"),
            retry_count: row.get("retry_count"),
            max_retries: row.get("max_retries"),
            created_at: row.get("created_at"),
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
        }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn queue(
        &self,
        book_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
        max_retries: i32,
    ) -> Result<Uuid> {
        let job_id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO job_queue (id, book_id, job_type, status, priority, payload, max_retries, created_at)
             VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7)",
        )
        .bind(job_id)
        .bind(book_id)
        .bind(Self::job_type_to_str(job_type))
        .bind(priority)
        .bind(&payload)
        .bind(max_retries)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.notify.notify_waiters();
        Ok(job_id)
    }

    async fn claim_next(&self) -> Result<Option<Job>> {
        let now = Utc::now();

        // FOR UPDATE SKIP LOCKED: concurrent claimers each get a distinct row.
        let row = sqlx::query(
            "UPDATE job_queue
             SET status = 'running', started_at = $1
             WHERE id = (
                 SELECT id FROM job_queue
                 WHERE status = 'pending'
                 ORDER BY priority DESC, created_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING id, book_id, job_type, status, priority, payload,
                       error_message, retry_count, max_retries,
                       created_at, started_at, completed_at",
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_job_row))
    }

    async fn complete(&self, job_id: Uuid) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE job_queue
             SET status = 'completed', completed_at = $1
             WHERE id = $2",
        )
        .bind(now)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let (retry_count, max_retries): (i32, i32) =
            sqlx::query_as("SELECT retry_count, max_retries FROM job_queue WHERE id = $1")
                .bind(job_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if retry_count < max_retries {
            // Retries remain: reset to pending with incremented retry count
            sqlx::query(
                "UPDATE job_queue
                 SET status = 'pending', retry_count = $1, error_message = $2, started_at = NULL
                 WHERE id = $3",
            )
            .bind(retry_count + 1)
            .bind(error)
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        } else {
            sqlx::query(
                "UPDATE job_queue
                 SET status = 'failed', error_message = $1, completed_at = $2
                 WHERE id = $3",
            )
            .bind(error)
            .bind(now)
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        if retry_count < max_retries {
            self.notify.notify_waiters();
        }
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(
            "SELECT id, book_id, job_type, status, priority, payload,
                    error_message, retry_count, max_retries,
                    created_at, started_at, completed_at
             FROM job_queue WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_job_row))
    }

    async fn pending_count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM job_queue WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(count)
    }
}
