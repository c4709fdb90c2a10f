//! Review repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use tome_core::{CreateReviewRequest, Error, Result, Review, ReviewRepository};

/// PostgreSQL implementation of ReviewRepository.
///
/// The foreign key on `book_id` is enforced by the schema; the API layer
/// checks book existence first so clients get a 404 rather than a
/// constraint-violation 500.
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: Pool<Postgres>,
}

impl PgReviewRepository {
    /// Create a new PgReviewRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: sqlx::postgres::PgRow) -> Review {
        Review {
            id: row.get("id"),
            book_id: row.get("book_id"),
            user_id: row.get("user_id"),
            review_text: row.get("review_text"),
            rating: row.get("rating"),
        }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(
        &self,
        book_id: i64,
        user_id: &str,
        req: CreateReviewRequest,
    ) -> Result<Review> {
        let row = sqlx::query(
            "INSERT INTO reviews (book_id, user_id, review_text, rating)
             VALUES ($1, $2, $3, $4)
             RETURNING id, book_id, user_id, review_text, rating",
        )
        .bind(book_id)
        .bind(user_id)
        .bind(&req.review_text)
        .bind(req.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::parse_row(row))
    }

    async fn list_for_book(&self, book_id: i64) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, book_id, user_id, review_text, rating
             FROM reviews WHERE book_id = $1 ORDER BY id ASC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_row).collect())
    }
}
