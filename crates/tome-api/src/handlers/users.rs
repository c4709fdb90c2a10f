//! Registration, token issuance, and preference endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::Deserialize;
use tracing::info;

use tome_core::{defaults, models::UserPreferences, TokenRepository, UserRepository};

use crate::auth::{self, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Form body for `/auth/register` and `/auth/token`.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Success body for registration. Names the new account so clients can
/// confirm which username was actually stored.
fn registration_message(username: &str) -> String {
    format!("User registered successfully: {}", username)
}

/// `POST /auth/register` — create a user account.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&form.password)?;
    state.db.users.create(&form.username, &password_hash).await?;

    info!(username = %form.username, "User registered");
    Ok(Json(serde_json::json!({
        "message": registration_message(&form.username),
    })))
}

/// `POST /auth/token` — password login, issuing an opaque bearer token.
///
/// The lookup and the verify both collapse into the same "Invalid
/// credentials" response so the endpoint does not reveal which usernames
/// exist.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users
        .get(&form.username)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    if !auth::verify_password(&form.password, &user.password_hash) {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let token = auth::generate_token();
    state
        .db
        .tokens
        .insert(
            &auth::hash_token(&token),
            &user.username,
            defaults::TOKEN_TTL_SECS,
        )
        .await?;

    info!(username = %user.username, "Access token issued");
    Ok(Json(serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
    })))
}

/// `POST /preferences` — overwrite the caller's preference tuple.
pub async fn save_preferences(
    State(state): State<AppState>,
    user: AuthUser,
    Json(prefs): Json<UserPreferences>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .users
        .save_preferences(&user.username, &prefs)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Preferences saved successfully",
    })))
}
