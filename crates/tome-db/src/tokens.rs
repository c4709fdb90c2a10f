//! Bearer token repository implementation.
//!
//! Tokens are opaque random values. Only a SHA-256 hex digest is stored, so
//! a database leak never exposes live credentials. Lookups enforce expiry
//! in the query itself.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use tome_core::{Error, Result, TokenRepository};

/// PostgreSQL implementation of TokenRepository.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: Pool<Postgres>,
}

impl PgTokenRepository {
    /// Create a new PgTokenRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Drop expired tokens. Called opportunistically; not required for
    /// correctness since `resolve` filters on expiry.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn insert(&self, token_hash: &str, username: &str, ttl_secs: i64) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);
        sqlx::query(
            "INSERT INTO access_tokens (token_hash, username, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(token_hash)
        .bind(username)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn resolve(&self, token_hash: &str) -> Result<Option<String>> {
        let username: Option<String> = sqlx::query_scalar(
            "SELECT username FROM access_tokens
             WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(username)
    }
}
