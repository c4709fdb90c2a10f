//! Review endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use tome_core::{models::CreateReviewRequest, BookRepository, ReviewRepository};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /books/{id}/reviews` — add a review, attributed to the caller.
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(book_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject reviews against missing books up front for a clean 404.
    state
        .db
        .books
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let review = state
        .db
        .reviews
        .insert(book_id, &user.username, req)
        .await?;
    Ok(Json(review))
}

/// `GET /books/{id}/reviews` — list reviews for a book.
pub async fn get_reviews(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.db.reviews.list_for_book(book_id).await?;
    Ok(Json(reviews))
}
