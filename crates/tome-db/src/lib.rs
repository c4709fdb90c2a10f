//! # tome-db
//!
//! PostgreSQL database layer for tome.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for books, reviews, users, tokens, and jobs
//! - The combined [`Database`] handle that is constructed once at process
//!   start and passed down explicitly (no process-wide singleton)
//!
//! ## Example
//!
//! ```rust,ignore
//! use tome_db::Database;
//! use tome_core::BookRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/tome").await?;
//!     let books = db.books.list().await?;
//!     println!("{} books", books.len());
//!     Ok(())
//! }
//! ```

pub mod books;
pub mod jobs;
pub mod pool;
pub mod reviews;
pub mod tokens;
pub mod users;

// Re-export core types
pub use tome_core::*;

// Re-export repository implementations
pub use books::PgBookRepository;
pub use jobs::PgJobRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use reviews::PgReviewRepository;
pub use tokens::PgTokenRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Book repository for catalog CRUD.
    pub books: PgBookRepository,
    /// Review repository.
    pub reviews: PgReviewRepository,
    /// User and preference repository.
    pub users: PgUserRepository,
    /// Bearer token repository.
    pub tokens: PgTokenRepository,
    /// Job repository for background processing.
    pub jobs: PgJobRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            books: PgBookRepository::new(pool.clone()),
            reviews: PgReviewRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
