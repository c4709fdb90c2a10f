//! # tome-jobs
//!
//! Background job queue processing and the summarization pipeline for tome.
//!
//! This crate provides:
//! - A polling worker with bounded concurrency over the Postgres queue
//! - The `summarize_upload` job handler (extract, chunk, generate, finalize)
//! - Text extraction and sliding-window chunking utilities
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tome_db::Database;
//! use tome_inference::OllamaBackend;
//! use tome_jobs::{JobWorker, SummarizeUploadHandler, WorkerConfig};
//!
//! let db = Database::connect("postgres://...").await?;
//! let backend = Arc::new(OllamaBackend::from_env());
//!
//! let mut worker = JobWorker::new(db.clone(), WorkerConfig::from_env());
//! worker.register_handler(SummarizeUploadHandler::new(
//!     Arc::new(db.books.clone()),
//!     backend,
//! ));
//!
//! let handle = worker.start();
//! // ... later
//! handle.shutdown().await?;
//! ```

pub mod chunking;
pub mod extract;
pub mod handler;
pub mod summarize;
pub mod worker;

// Re-export core types
pub use tome_core::*;

pub use chunking::{Chunk, ChunkerConfig, SlidingWindowChunker};
pub use handler::{JobContext, JobHandler, JobResult};
pub use summarize::{select_strategy, Summarizer, SummarizeUploadHandler, SummaryStrategy};
pub use worker::{JobWorker, WorkerConfig, WorkerHandle};
