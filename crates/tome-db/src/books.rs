//! Book repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use tome_core::{Book, BookRepository, CreateBookRequest, Error, Result};

/// PostgreSQL implementation of BookRepository.
#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    /// Create a new PgBookRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: sqlx::postgres::PgRow) -> Book {
        Book {
            id: row.get("id"),
            title: row.get("title"),
            author: row.get("author"),
            genre: row.get("genre"),
            year_published: row.get("year_published"),
            summary: row.get("summary"),
        }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn insert(&self, req: CreateBookRequest) -> Result<Book> {
        let row = sqlx::query(
            "INSERT INTO books (title, author, genre, year_published, summary)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, author, genre, year_published, summary",
        )
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.genre)
        .bind(req.year_published)
        .bind(&req.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let book = Self::parse_row(row);
        debug!(
            subsystem = "db",
            book_id = book.id,
            op = "insert",
            "Inserted book"
        );
        Ok(book)
    }

    async fn get(&self, id: i64) -> Result<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, title, author, genre, year_published, summary
             FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_row))
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            "SELECT id, title, author, genre, year_published, summary
             FROM books ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_row).collect())
    }

    async fn update_summary(&self, id: i64, summary: &str) -> Result<()> {
        let result = sqlx::query("UPDATE books SET summary = $1 WHERE id = $2")
            .bind(summary)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::BookNotFound(id));
        }
        Ok(())
    }
}
