//! Integration tests for the Postgres repositories.
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database
//! reachable via `DATABASE_URL`. They are ignored by default; run them with
//! `cargo test -p tome-db -- --ignored`.

use uuid::Uuid;

use tome_db::{
    models::{CreateBookRequest, CreateReviewRequest, UserPreferences},
    BookRepository, Database, Error, JobRepository, JobStatus, JobType, ReviewRepository,
    TokenRepository, UserRepository,
};

const DEFAULT_TEST_DATABASE_URL: &str = "postgres://localhost/tome_test";

/// Helper to create a test database connection.
async fn setup_test_db() -> Database {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());

    Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database")
}

/// Complete any pending jobs left over from other tests or prior runs so
/// claim-based assertions are deterministic.
async fn drain_pending_jobs(db: &Database) {
    while let Some(job) = db.jobs.claim_next().await.unwrap() {
        db.jobs.complete(job.id).await.unwrap();
    }
}

fn sample_book(title: &str) -> CreateBookRequest {
    CreateBookRequest {
        title: title.to_string(),
        author: "Test Author".to_string(),
        genre: "Fiction".to_string(),
        year_published: 2021,
        summary: Some("Generating...".to_string()),
    }
}

/// Unique username per test run so reruns don't collide.
fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_book_insert_get_and_summary_update() {
    let db = setup_test_db().await;

    let book = db.books.insert(sample_book("Lifecycle Book")).await.unwrap();
    assert!(book.id > 0);
    assert_eq!(book.summary.as_deref(), Some("Generating..."));
    assert!(!book.summary_ready());

    let fetched = db.books.get(book.id).await.unwrap().unwrap();
    assert_eq!(fetched, book);

    db.books
        .update_summary(book.id, "A finalized summary.")
        .await
        .unwrap();
    let finalized = db.books.get(book.id).await.unwrap().unwrap();
    assert_eq!(finalized.summary.as_deref(), Some("A finalized summary."));
    assert!(finalized.summary_ready());
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_update_summary_missing_book_is_not_found() {
    let db = setup_test_db().await;

    let err = db
        .books
        .update_summary(i64::MAX, "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BookNotFound(_)));
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_reviews_attach_to_book() {
    let db = setup_test_db().await;

    let book = db.books.insert(sample_book("Reviewed Book")).await.unwrap();
    let review = db
        .reviews
        .insert(
            book.id,
            "reviewer",
            CreateReviewRequest {
                review_text: "Gripping stuff.".to_string(),
                rating: 5,
            },
        )
        .await
        .unwrap();
    assert_eq!(review.book_id, book.id);
    assert_eq!(review.user_id, "reviewer");

    let reviews = db.reviews.list_for_book(book.id).await.unwrap();
    assert!(reviews.iter().any(|r| r.id == review.id));
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_duplicate_username_is_conflict() {
    let db = setup_test_db().await;
    let username = unique_username("dup");

    db.users.create(&username, "hash-one").await.unwrap();
    let err = db.users.create(&username, "hash-two").await.unwrap_err();
    assert!(matches!(err, Error::Conflict(msg) if msg == "Username already taken"));
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_preferences_overwrite() {
    let db = setup_test_db().await;
    let username = unique_username("prefs");

    db.users.create(&username, "hash").await.unwrap();
    let user = db.users.get(&username).await.unwrap().unwrap();
    assert!(user.preferences().is_none());

    db.users
        .save_preferences(
            &username,
            &UserPreferences {
                genre: Some("Fantasy".to_string()),
                author: None,
                min_year: Some(1990),
                max_year: None,
            },
        )
        .await
        .unwrap();

    // A second save replaces the tuple, it does not merge
    db.users
        .save_preferences(
            &username,
            &UserPreferences {
                genre: Some("Horror".to_string()),
                author: Some("King".to_string()),
                min_year: None,
                max_year: None,
            },
        )
        .await
        .unwrap();

    let prefs = db
        .users
        .get(&username)
        .await
        .unwrap()
        .unwrap()
        .preferences()
        .unwrap();
    assert_eq!(prefs.genre.as_deref(), Some("Horror"));
    assert_eq!(prefs.author.as_deref(), Some("King"));
    assert!(prefs.min_year.is_none());
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_token_resolve_and_expiry() {
    let db = setup_test_db().await;
    let username = unique_username("token");
    db.users.create(&username, "hash").await.unwrap();

    let live_hash = format!("live-{}", Uuid::now_v7().simple());
    db.tokens.insert(&live_hash, &username, 1800).await.unwrap();
    assert_eq!(
        db.tokens.resolve(&live_hash).await.unwrap().as_deref(),
        Some(username.as_str())
    );

    // Already-expired token resolves to nothing
    let dead_hash = format!("dead-{}", Uuid::now_v7().simple());
    db.tokens.insert(&dead_hash, &username, -60).await.unwrap();
    assert!(db.tokens.resolve(&dead_hash).await.unwrap().is_none());

    assert!(db.tokens.resolve("never-issued").await.unwrap().is_none());

    // Purging drops the expired row and leaves the live one alone
    let purged = db.tokens.purge_expired().await.unwrap();
    assert!(purged >= 1);
    assert!(db.tokens.resolve(&dead_hash).await.unwrap().is_none());
    assert_eq!(
        db.tokens.resolve(&live_hash).await.unwrap().as_deref(),
        Some(username.as_str())
    );
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_job_queue_lifecycle() {
    let db = setup_test_db().await;
    drain_pending_jobs(&db).await;

    let book = db.books.insert(sample_book("Queued Book")).await.unwrap();
    let job_id = db
        .jobs
        .queue(
            Some(book.id),
            JobType::SummarizeUpload,
            JobType::SummarizeUpload.default_priority(),
            Some(serde_json::json!({
                "book_id": book.id,
                "scratch_path": "/tmp/none",
            })),
            0,
        )
        .await
        .unwrap();

    let job = db.jobs.get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.book_id, Some(book.id));

    // Claim moves it to running; completing finalizes it
    let claimed = db.jobs.claim_next().await.unwrap().unwrap();
    assert_eq!(claimed.id, job_id);
    assert_eq!(claimed.status, JobStatus::Running);
    db.jobs.complete(claimed.id).await.unwrap();

    let done = db.jobs.get(claimed.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.completed_at.is_some());
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_job_fail_without_retries_is_terminal() {
    let db = setup_test_db().await;
    drain_pending_jobs(&db).await;

    let job_id = db
        .jobs
        .queue(None, JobType::SummarizeUpload, 5, None, 0)
        .await
        .unwrap();

    let claimed = db.jobs.claim_next().await.unwrap().unwrap();
    assert_eq!(claimed.id, job_id);

    db.jobs.fail(job_id, "pipeline exploded").await.unwrap();
    let failed = db.jobs.get(job_id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("pipeline exploded"));
}
