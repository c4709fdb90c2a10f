//! Book catalog endpoints: upload intake, reads, and summary access.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};

use tome_core::{
    defaults,
    models::{CreateBookRequest, SummarizeJobPayload},
    new_v7, BookRepository, JobRepository, JobType,
};
use tome_inference::prompts;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Parsed upload form.
struct UploadForm {
    title: String,
    author: String,
    genre: String,
    year_published: i32,
    quick: bool,
    file_name: Option<String>,
    file_bytes: Vec<u8>,
}

/// Pull the required fields out of the multipart stream. Every metadata
/// field and the file itself are required; `quick` defaults to false.
async fn parse_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut title = None;
    let mut author = None;
    let mut genre = None;
    let mut year_published = None;
    let mut quick = false;
    let mut file_name = None;
    let mut file_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "title" => title = Some(read_text(field).await?),
            "author" => author = Some(read_text(field).await?),
            "genre" => genre = Some(read_text(field).await?),
            "year_published" => {
                let raw = read_text(field).await?;
                year_published = Some(raw.parse::<i32>().map_err(|_| {
                    ApiError::BadRequest(format!("Invalid year_published: {}", raw))
                })?);
            }
            "quick" => {
                let raw = read_text(field).await?;
                quick = matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes");
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            other => {
                warn!(field = other, "Ignoring unknown upload field");
            }
        }
    }

    Ok(UploadForm {
        title: title.ok_or_else(|| missing("title"))?,
        author: author.ok_or_else(|| missing("author"))?,
        genre: genre.ok_or_else(|| missing("genre"))?,
        year_published: year_published.ok_or_else(|| missing("year_published"))?,
        quick,
        file_name,
        file_bytes: file_bytes.ok_or_else(|| missing("file"))?,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed field: {}", e)))
}

fn missing(field: &str) -> ApiError {
    ApiError::BadRequest(format!("Missing required field: {}", field))
}

/// `POST /books/` — upload intake.
///
/// Writes the document to scratch storage, inserts the catalog record with
/// the in-flight sentinel, and queues the summarization job. The record is
/// committed before the job is queued, so a client can poll its status the
/// moment this returns.
pub async fn add_book(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_upload(multipart).await?;

    // Keep the original extension so scratch files stay identifiable on disk.
    let extension = form
        .file_name
        .as_deref()
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let scratch_path = state
        .scratch_dir
        .join(format!("upload-{}{}", new_v7(), extension));

    tokio::fs::write(&scratch_path, &form.file_bytes)
        .await
        .map_err(|e| ApiError::Internal(tome_core::Error::Io(e)))?;

    let book = state
        .db
        .books
        .insert(CreateBookRequest {
            title: form.title,
            author: form.author,
            genre: form.genre,
            year_published: form.year_published,
            summary: Some(defaults::SUMMARY_SENTINEL.to_string()),
        })
        .await?;

    let payload = SummarizeJobPayload {
        book_id: book.id,
        scratch_path: scratch_path.to_string_lossy().into_owned(),
        quick: form.quick,
    };

    // Single attempt: a failed pipeline run finalizes the record with the
    // error marker instead of retrying.
    let queue_result = state
        .db
        .jobs
        .queue(
            Some(book.id),
            JobType::SummarizeUpload,
            JobType::SummarizeUpload.default_priority(),
            Some(serde_json::to_value(&payload).map_err(tome_core::Error::from)?),
            0,
        )
        .await;

    match queue_result {
        Ok(job_id) => {
            info!(
                book_id = book.id,
                %job_id,
                quick = form.quick,
                upload_bytes = form.file_bytes.len(),
                "Book uploaded, summarization queued"
            );
            Ok(Json(book))
        }
        Err(e) => {
            // The record must not sit on the sentinel with no job in flight.
            state
                .db
                .books
                .update_summary(book.id, defaults::SUMMARY_ERROR_MARKER)
                .await?;
            let _ = tokio::fs::remove_file(&scratch_path).await;
            Err(e.into())
        }
    }
}

/// `GET /books/` — list all books.
pub async fn get_all_books(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let books = state.db.books.list().await?;
    Ok(Json(books))
}

/// `GET /books/{id}` — fetch one book.
pub async fn get_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .db
        .books
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;
    Ok(Json(book))
}

/// `GET /books/{id}/summary/status` — polling endpoint for the pipeline.
pub async fn get_summary_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .db
        .books
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "book_id": book.id,
        "summary_ready": book.summary_ready(),
    })))
}

/// `GET /books/{id}/summary` — on-demand summary over the stored record.
///
/// This is a synchronous generation call; upstream failures surface to the
/// caller as a gateway error rather than an error marker.
pub async fn get_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .db
        .books
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let prompt = prompts::on_demand_summary(&book.title, book.summary.as_deref().unwrap_or(""));
    let generated = state.backend.generate(&prompt).await?;

    Ok(Json(serde_json::json!({
        "generated_summary": generated,
    })))
}
