//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// API-level error with an HTTP status mapping.
///
/// Every variant renders as `{"error": message}`. Internal database errors
/// keep their message out of the response body.
#[derive(Debug)]
pub enum ApiError {
    Internal(tome_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
}

impl From<tome_core::Error> for ApiError {
    fn from(err: tome_core::Error) -> Self {
        match err {
            tome_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            tome_core::Error::BookNotFound(_) => ApiError::NotFound("Book not found".to_string()),
            tome_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            // Registration conflicts surface as 400 to match the public API
            // contract, not 409.
            tome_core::Error::Conflict(msg) => ApiError::BadRequest(msg),
            tome_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            tome_core::Error::Inference(msg) => ApiError::BadGateway(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "Internal error serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
