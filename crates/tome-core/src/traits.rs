//! Trait seams between the tome crates.
//!
//! Repositories abstract the Postgres layer; `GenerationBackend` abstracts
//! the language-model client. Handlers and HTTP routes depend on these
//! traits, never on concrete implementations, so tests can substitute
//! in-memory or mock versions.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::{
    Book, CreateBookRequest, CreateReviewRequest, Job, JobType, Review, User, UserPreferences,
};
use crate::Result;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for book catalog records.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book and return it with its assigned id.
    async fn insert(&self, req: CreateBookRequest) -> Result<Book>;

    /// Fetch a book by id.
    async fn get(&self, id: i64) -> Result<Option<Book>>;

    /// List all books in insertion order.
    async fn list(&self) -> Result<Vec<Book>>;

    /// Replace the summary column for a book. Used exactly once per record
    /// by the pipeline (final text or error marker replacing the sentinel).
    async fn update_summary(&self, id: i64, summary: &str) -> Result<()>;
}

/// Repository for book reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review for a book authored by `user_id`.
    async fn insert(&self, book_id: i64, user_id: &str, req: CreateReviewRequest)
        -> Result<Review>;

    /// List all reviews for a book.
    async fn list_for_book(&self, book_id: i64) -> Result<Vec<Review>>;
}

/// Repository for users, credentials, and preference tuples.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user with a pre-hashed password. Fails with Conflict when
    /// the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<()>;

    /// Fetch a user by username.
    async fn get(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite the user's preference tuple (no history kept).
    async fn save_preferences(&self, username: &str, prefs: &UserPreferences) -> Result<()>;
}

/// Repository for opaque bearer tokens. Tokens are stored hashed; lookups
/// resolve a presented token to a username and enforce expiry.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token hash for a username with a TTL.
    async fn insert(&self, token_hash: &str, username: &str, ttl_secs: i64) -> Result<()>;

    /// Resolve a token hash to a username if present and unexpired.
    async fn resolve(&self, token_hash: &str) -> Result<Option<String>>;
}

/// Repository for the background job queue.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Queue a new job. `max_retries = 0` means a single attempt.
    async fn queue(
        &self,
        book_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
        max_retries: i32,
    ) -> Result<Uuid>;

    /// Claim the next pending job for processing (FIFO within priority).
    async fn claim_next(&self) -> Result<Option<Job>>;

    /// Mark a job as completed.
    async fn complete(&self, job_id: Uuid) -> Result<()>;

    /// Mark a job as failed, or re-queue it when retries remain.
    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()>;

    /// Get a job by id.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Count pending jobs.
    async fn pending_count(&self) -> Result<i64>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
///
/// The wire response is normalized here: implementations always hand back a
/// plain `String`, never a provider-specific response shape.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
