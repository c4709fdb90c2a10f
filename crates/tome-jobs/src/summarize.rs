//! The document summarization pipeline and its job handler.
//!
//! Pipeline: read the scratch file, extract text as pages, chunk it, pick a
//! strategy by document shape, run the generation calls, and write the final
//! summary over the book's in-flight sentinel. Any failure writes the error
//! marker instead, so a book never reports "generating" forever. The scratch
//! file is deleted on every exit path.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use tome_core::{
    defaults, models::SummarizeJobPayload, BookRepository, Error, GenerationBackend, JobType,
    Result,
};
use tome_inference::prompts;

use crate::chunking::{mean_chunk_len, Chunk, SlidingWindowChunker};
use crate::extract::{assemble_text, extract_pages};
use crate::handler::{JobContext, JobHandler, JobResult};

/// How the pipeline combines per-chunk generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    /// Sequential fold: each chunk refines the running summary. Used for
    /// long or dense documents where chunk order carries meaning.
    Refine,
    /// Summarize chunks independently, then combine the partial summaries.
    MapReduce,
}

/// Pick a strategy from the document's chunk shape.
///
/// Documents with more than 20 chunks, or a mean chunk length above 1000
/// bytes, get the sequential refine treatment; everything else is
/// map-reduced.
pub fn select_strategy(chunks: &[Chunk]) -> SummaryStrategy {
    if chunks.len() > defaults::REFINE_CHUNK_COUNT_THRESHOLD
        || mean_chunk_len(chunks) > defaults::REFINE_MEAN_CHUNK_LEN_THRESHOLD
    {
        SummaryStrategy::Refine
    } else {
        SummaryStrategy::MapReduce
    }
}

/// Runs the chunk-and-generate pipeline against a generation backend.
pub struct Summarizer {
    backend: Arc<dyn GenerationBackend>,
    chunker: SlidingWindowChunker,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            chunker: SlidingWindowChunker::default(),
        }
    }

    /// Summarize a full document text.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Job(
                "No text could be extracted from the document".to_string(),
            ));
        }

        let chunks = self.chunker.chunk(text);
        let strategy = select_strategy(&chunks);

        debug!(
            subsystem = "jobs",
            component = "summarize",
            chunk_count = chunks.len(),
            ?strategy,
            model = self.backend.model_name(),
            "Starting summarization"
        );

        if chunks.len() == 1 {
            return self.backend.generate(&prompts::summarize_content(text)).await;
        }

        match strategy {
            SummaryStrategy::Refine => self.refine(&chunks).await,
            SummaryStrategy::MapReduce => self.map_reduce(&chunks).await,
        }
    }

    /// Sequential fold: summarize the first chunk, then refine with each
    /// subsequent chunk.
    async fn refine(&self, chunks: &[Chunk]) -> Result<String> {
        let mut running = self
            .backend
            .generate(&prompts::summarize_content(&chunks[0].text))
            .await?;

        for chunk in &chunks[1..] {
            running = self
                .backend
                .generate(&prompts::refine_step(&running, &chunk.text))
                .await?;
        }

        Ok(running)
    }

    /// Summarize every chunk independently, then combine the partials.
    async fn map_reduce(&self, chunks: &[Chunk]) -> Result<String> {
        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let partial = self
                .backend
                .generate(&prompts::summarize_content(&chunk.text))
                .await?;
            partials.push(partial);
        }

        if partials.len() == 1 {
            return Ok(partials.pop().unwrap_or_default());
        }

        self.backend
            .generate(&prompts::combine_summaries(&partials))
            .await
    }
}

/// Handler for `summarize_upload` jobs.
///
/// Owns the finalization contract: on success the book's summary becomes the
/// generated text, on any failure it becomes the error marker, and in both
/// cases the scratch file is removed. The extraction-and-generation phase is
/// bounded by a timeout that counts as a failure; the timeout wraps only
/// that phase, never finalization, so the worker must not cancel this
/// handler from the outside.
pub struct SummarizeUploadHandler {
    books: Arc<dyn BookRepository>,
    summarizer: Summarizer,
    pipeline_timeout: Duration,
}

impl SummarizeUploadHandler {
    pub fn new(books: Arc<dyn BookRepository>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            books,
            summarizer: Summarizer::new(backend),
            pipeline_timeout: Duration::from_secs(defaults::JOB_TIMEOUT_SECS),
        }
    }

    /// Cap the extraction-and-generation phase at `secs` seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.pipeline_timeout = Duration::from_secs(secs.max(1));
        self
    }

    /// The happy path, separated out so the caller can handle all failure
    /// modes in one place.
    async fn run_pipeline(&self, payload: &SummarizeJobPayload) -> Result<String> {
        let pages = extract_pages(Path::new(&payload.scratch_path)).await?;
        let text = assemble_text(&pages, payload.quick);

        debug!(
            subsystem = "jobs",
            component = "summarize",
            book_id = payload.book_id,
            page_count = pages.len(),
            quick = payload.quick,
            "Document extracted"
        );

        self.summarizer.summarize(&text).await
    }

    /// Write the error marker. Finalization must not be silently skipped,
    /// so a write failure here is logged at error level.
    async fn mark_failed(&self, book_id: i64) {
        if let Err(e) = self
            .books
            .update_summary(book_id, defaults::SUMMARY_ERROR_MARKER)
            .await
        {
            error!(
                error = ?e,
                book_id,
                "Failed to write summary error marker"
            );
        }
    }
}

#[async_trait]
impl JobHandler for SummarizeUploadHandler {
    fn job_type(&self) -> JobType {
        JobType::SummarizeUpload
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let start = Instant::now();

        let payload: SummarizeJobPayload = match ctx.payload() {
            Ok(p) => p,
            Err(e) => {
                // No scratch path to clean up and no trustworthy book id;
                // fall back to the job row's book_id if it has one.
                if let Some(book_id) = ctx.book_id() {
                    self.mark_failed(book_id).await;
                }
                return JobResult::Failed(e.to_string());
            }
        };

        // Bound only the pipeline phase. Finalization below must run even
        // when the pipeline times out, otherwise the book would report the
        // in-flight sentinel forever and the scratch file would leak.
        let outcome = match tokio::time::timeout(
            self.pipeline_timeout,
            self.run_pipeline(&payload),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Job(format!(
                "Summarization timed out after {}s",
                self.pipeline_timeout.as_secs()
            ))),
        };

        // The scratch file is single-use regardless of outcome.
        if let Err(e) = tokio::fs::remove_file(&payload.scratch_path).await {
            warn!(
                error = %e,
                scratch_path = %payload.scratch_path,
                "Failed to remove scratch file"
            );
        }

        match outcome {
            Ok(summary) => {
                if let Err(e) = self.books.update_summary(payload.book_id, &summary).await {
                    error!(error = ?e, book_id = payload.book_id, "Failed to store summary");
                    self.mark_failed(payload.book_id).await;
                    return JobResult::Failed(e.to_string());
                }
                info!(
                    book_id = payload.book_id,
                    summary_len = summary.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Summary finalized"
                );
                JobResult::Success
            }
            Err(e) => {
                warn!(
                    error = %e,
                    book_id = payload.book_id,
                    "Summarization pipeline failed"
                );
                self.mark_failed(payload.book_id).await;
                JobResult::Failed(e.to_string())
            }
        }
    }
}
