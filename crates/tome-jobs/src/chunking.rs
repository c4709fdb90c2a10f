//! Sliding-window text chunking for the summarization pipeline.
//!
//! Extracted book text is split into fixed-size windows with a small overlap
//! so no sentence is lost at a window boundary. Window boundaries are always
//! snapped to UTF-8 character boundaries.

use tome_core::defaults;

/// Configuration for the sliding-window chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum size of a chunk in bytes.
    pub chunk_size: usize,
    /// Number of bytes shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            overlap: defaults::CHUNK_OVERLAP,
        }
    }
}

/// A text chunk with its position in the original document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Starting byte offset in the original document.
    pub start_offset: usize,
    /// Ending byte offset in the original document.
    pub end_offset: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fixed-size chunker with configurable overlap.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    config: ChunkerConfig,
}

impl SlidingWindowChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunk the given text into overlapping windows.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return vec![];
        }

        if text.len() <= self.config.chunk_size {
            return vec![Chunk {
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len(),
            }];
        }

        let step_size = if self.config.overlap >= self.config.chunk_size {
            1 // Prevent infinite loop
        } else {
            self.config
                .chunk_size
                .saturating_sub(self.config.overlap)
                .max(1)
        };

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.config.chunk_size).min(text.len());

            // Ensure UTF-8 boundary
            end = find_char_boundary_before(text, end);

            if end > start {
                chunks.push(Chunk {
                    text: text[start..end].to_string(),
                    start_offset: start,
                    end_offset: end,
                });
            }

            if end >= text.len() {
                break;
            }

            start += step_size;
            start = find_char_boundary_after(text, start);
        }

        chunks
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}

impl Default for SlidingWindowChunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

/// Mean chunk length in bytes, 0.0 for an empty slice.
pub fn mean_chunk_len(chunks: &[Chunk]) -> f64 {
    if chunks.is_empty() {
        return 0.0;
    }
    let total: usize = chunks.iter().map(Chunk::len).sum();
    total as f64 / chunks.len() as f64
}

/// Find UTF-8 safe boundary at or before the given position.
fn find_char_boundary_before(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Find UTF-8 safe boundary at or after the given position.
fn find_char_boundary_after(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}
