//! Centralized default constants for the tome system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// SUMMARY PIPELINE
// =============================================================================

/// Placeholder written into a book's summary column while the background
/// pipeline is running. Readers treat any other value as final.
pub const SUMMARY_SENTINEL: &str = "Generating...";

/// Marker written into the summary column when the pipeline fails, so the
/// sentinel never lingers forever. Distinguishable from both the sentinel
/// and a real summary.
pub const SUMMARY_ERROR_MARKER: &str = "Summary generation failed";

/// Maximum characters per chunk for text splitting.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap characters between adjacent chunks for context preservation.
pub const CHUNK_OVERLAP: usize = 150;

/// Chunk count above which the iterative refine strategy is selected.
pub const REFINE_CHUNK_COUNT_THRESHOLD: usize = 20;

/// Mean chunk length above which the refine strategy is selected.
pub const REFINE_MEAN_CHUNK_LEN_THRESHOLD: f64 = 1000.0;

/// Pages kept when the `quick` upload flag is set (bounded-cost preview).
pub const QUICK_PAGE_LIMIT: usize = 10;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model.
pub const GEN_MODEL: &str = "llama3";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// JOBS
// =============================================================================

/// Polling interval for the job worker when the queue is empty (ms).
pub const JOB_POLL_INTERVAL_MS: u64 = 500;

/// Max concurrent jobs per worker.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Per-job execution timeout (seconds).
pub const JOB_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Maximum request body size in bytes (64 MB; uploads are not otherwise
/// size-checked, so the body limit layer is the only bound).
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024 * 1024;

// =============================================================================
// AUTH
// =============================================================================

/// Bearer token lifetime (seconds). 30 minutes.
pub const TOKEN_TTL_SECS: i64 = 1800;
