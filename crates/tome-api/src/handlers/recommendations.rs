//! Recommendation endpoint: rule-based matching plus a one-line
//! model-generated blurb.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use tome_core::{BookRepository, UserRepository};
use tome_inference::prompts;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::recommend;
use crate::state::AppState;

/// `GET /recommendations` — recommend books matching the caller's saved
/// preferences.
pub async fn get_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .db
        .users
        .get(&user.username)
        .await?
        .ok_or_else(|| ApiError::NotFound("No preferences found for user".to_string()))?;

    let prefs = account
        .preferences()
        .ok_or_else(|| ApiError::NotFound("No preferences found for user".to_string()))?;

    let books = state.db.books.list().await?;
    let matched = recommend::score_books(&books, &prefs);

    debug!(
        username = %user.username,
        catalog_size = books.len(),
        matched = matched.len(),
        "Scored recommendations"
    );

    if matched.is_empty() {
        return Ok(Json(serde_json::json!({
            "message": "Sorry, we couldn't find any books matching your preferences.",
        })));
    }

    let titles: Vec<String> = matched.iter().map(|b| b.title.clone()).collect();
    let blurb = state
        .backend
        .generate(&prompts::recommendation_blurb(&prefs, &titles))
        .await?;

    Ok(Json(serde_json::json!({
        "recommendation_summary": prompts::first_line(&blurb),
        "books": matched,
    })))
}
