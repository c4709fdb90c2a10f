//! Job worker that drains the queue with bounded concurrency.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Notify};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use tome_core::{defaults, Job, JobRepository, JobType, Result};
use tome_db::Database;

use crate::handler::{JobContext, JobHandler, JobResult};

/// Configuration for the job worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Polling interval in milliseconds, used when the queue is empty.
    pub poll_interval_ms: u64,
    /// Maximum number of concurrently executing jobs.
    pub max_concurrent_jobs: usize,
    /// Whether to enable job processing.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::JOB_POLL_INTERVAL_MS,
            max_concurrent_jobs: defaults::JOB_MAX_CONCURRENT,
            enabled: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_WORKER_ENABLED` | `true` | Enable/disable job processing |
    /// | `JOB_MAX_CONCURRENT` | `4` | Max concurrent jobs |
    /// | `JOB_POLL_INTERVAL_MS` | `500` | Polling interval when queue is empty |
    pub fn from_env() -> Self {
        let enabled = std::env::var("JOB_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let max_concurrent_jobs = std::env::var("JOB_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::JOB_MAX_CONCURRENT)
            .max(1);

        let poll_interval_ms = std::env::var("JOB_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::JOB_POLL_INTERVAL_MS);

        Self {
            poll_interval_ms,
            max_concurrent_jobs,
            enabled,
        }
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set maximum concurrent jobs.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    /// Enable or disable job processing.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Handle for controlling a running worker.
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl WorkerHandle {
    /// Signal the worker to shut down gracefully. In-flight jobs run to
    /// completion before the loop exits.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| tome_core::Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }
}

/// Job worker that processes jobs from the queue.
pub struct JobWorker {
    db: Database,
    config: WorkerConfig,
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
    queue_notify: Arc<Notify>,
}

impl JobWorker {
    /// Create a new job worker.
    pub fn new(db: Database, config: WorkerConfig) -> Self {
        let queue_notify = db.jobs.job_notify();
        Self {
            db,
            config,
            handlers: HashMap::new(),
            queue_notify,
        }
    }

    /// Register a handler for a job type.
    pub fn register_handler<H: JobHandler + 'static>(&mut self, handler: H) {
        let job_type = handler.job_type();
        self.handlers.insert(job_type, Arc::new(handler));
        debug!(?job_type, "Registered job handler");
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        WorkerHandle { shutdown_tx }
    }

    /// Run the worker loop with concurrent job processing.
    ///
    /// Claims up to `max_concurrent_jobs` at a time and processes them
    /// concurrently. Sleeps only when the queue is empty, and wakes early
    /// when a new job is queued on this process.
    #[instrument(skip_all)]
    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Job worker is disabled, not starting");
            return;
        }

        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            max_concurrent = self.config.max_concurrent_jobs,
            "Job worker started"
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!("Job worker received shutdown signal");
                break;
            }

            let mut claimed = 0;
            let mut tasks = tokio::task::JoinSet::new();

            for _ in 0..self.config.max_concurrent_jobs {
                match self.claim_job().await {
                    Some(job) => {
                        claimed += 1;
                        let worker = self.clone_refs();
                        tasks.spawn(async move {
                            worker.execute_job(job).await;
                        });
                    }
                    None => break,
                }
            }

            if claimed == 0 {
                // Queue empty. Sleep until the poll tick, a local enqueue, or
                // shutdown, whichever comes first.
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Job worker received shutdown signal");
                        break;
                    }
                    _ = self.queue_notify.notified() => {}
                    _ = sleep(poll_interval) => {}
                }
            } else {
                debug!(claimed, "Processing concurrent job batch");
                while let Some(result) = tasks.join_next().await {
                    if let Err(e) = result {
                        error!(error = ?e, "Job task panicked");
                    }
                }
                // No sleep, immediately try to claim more jobs
            }
        }

        info!("Job worker stopped");
    }

    /// Claim the next available job without processing it.
    async fn claim_job(&self) -> Option<Job> {
        match self.db.jobs.claim_next().await {
            Ok(Some(job)) => Some(job),
            Ok(None) => None,
            Err(e) => {
                error!(error = ?e, "Failed to claim job");
                None
            }
        }
    }

    /// Clone references needed for spawned job tasks.
    fn clone_refs(&self) -> JobWorkerRef {
        JobWorkerRef {
            db: self.db.clone(),
            handlers: self.handlers.clone(),
        }
    }

    /// Get the pending job count.
    pub async fn pending_count(&self) -> Result<i64> {
        self.db.jobs.pending_count().await
    }
}

/// Reference bundle for executing a single job in a spawned task.
struct JobWorkerRef {
    db: Database,
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
}

impl JobWorkerRef {
    /// Execute a single claimed job.
    ///
    /// Handlers run to completion. Cancelling a handler future from here
    /// would skip its finalization (error markers, scratch cleanup), so any
    /// time bound on long-running work belongs inside the handler.
    async fn execute_job(self, job: Job) {
        let start = Instant::now();
        let job_id = job.id;
        let job_type = job.job_type;

        info!(%job_id, ?job_type, book_id = ?job.book_id, "Processing job");

        let result = match self.handlers.get(&job_type).cloned() {
            Some(handler) => handler.execute(JobContext::new(job)).await,
            None => {
                warn!(?job_type, "No handler registered for job type");
                JobResult::Failed(format!("No handler for job type: {:?}", job_type))
            }
        };

        match result {
            JobResult::Success => {
                if let Err(e) = self.db.jobs.complete(job_id).await {
                    error!(error = ?e, %job_id, "Failed to mark job as completed");
                } else {
                    info!(
                        %job_id,
                        ?job_type,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Job completed successfully"
                    );
                }
            }
            JobResult::Failed(error) => {
                if let Err(e) = self.db.jobs.fail(job_id, &error).await {
                    error!(error = ?e, %job_id, "Failed to mark job as failed");
                } else {
                    warn!(
                        %job_id,
                        ?job_type,
                        %error,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Job failed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.poll_interval_ms, defaults::JOB_POLL_INTERVAL_MS);
        assert_eq!(config.max_concurrent_jobs, defaults::JOB_MAX_CONCURRENT);
        assert!(config.enabled);
    }

    #[test]
    fn test_worker_config_builders() {
        let config = WorkerConfig::default()
            .with_poll_interval(100)
            .with_max_concurrent(2)
            .with_enabled(false);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.max_concurrent_jobs, 2);
        assert!(!config.enabled);
    }

    #[test]
    fn test_worker_config_max_concurrent_floor() {
        let config = WorkerConfig::default().with_max_concurrent(0);
        assert_eq!(config.max_concurrent_jobs, 1);
    }
}
