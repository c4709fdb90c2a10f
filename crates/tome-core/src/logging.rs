//! Structured logging field name constants for tome.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (pages, chunks) |

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ollama", "pool", "worker", "summarize"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "claim_next", "extract"
pub const OPERATION: &str = "op";

/// Book being operated on.
pub const BOOK_ID: &str = "book_id";

/// Job UUID being processed.
pub const JOB_ID: &str = "job_id";

/// Job type enum variant.
pub const JOB_TYPE: &str = "job_type";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of chunks processed by the summarizer.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of pages extracted from a document.
pub const PAGE_COUNT: &str = "page_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
