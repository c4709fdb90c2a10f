//! User and credential repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use tome_core::{Error, Result, User, UserPreferences, UserRepository};

/// PostgreSQL implementation of UserRepository.
///
/// The preference tuple is embedded in the user row: one set per user,
/// overwritten on each save.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: sqlx::postgres::PgRow) -> User {
        User {
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            pref_genre: row.get("pref_genre"),
            pref_author: row.get("pref_author"),
            pref_min_year: row.get("pref_min_year"),
            pref_max_year: row.get("pref_max_year"),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict("Username already taken".to_string()));
        }

        debug!(subsystem = "db", op = "create_user", username, "Created user");
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT username, password_hash, pref_genre, pref_author, pref_min_year, pref_max_year
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_row))
    }

    async fn save_preferences(&self, username: &str, prefs: &UserPreferences) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users
             SET pref_genre = $1, pref_author = $2, pref_min_year = $3, pref_max_year = $4
             WHERE username = $5",
        )
        .bind(&prefs.genre)
        .bind(&prefs.author)
        .bind(prefs.min_year)
        .bind(prefs.max_year)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", username)));
        }
        Ok(())
    }
}
