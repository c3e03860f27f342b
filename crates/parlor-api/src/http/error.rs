//! Application error type mapping to HTTP status codes.
//!
//! Every error body is `{"error": "<message>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parlor_types::error::{ChatError, ProfileError, RepositoryError};

pub const MISSING_USER_ID: &str = "Missing user_id";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Logged in full; the client only sees a generic message.
    Internal(String),
}

impl AppError {
    pub fn missing_user_id() -> Self {
        AppError::BadRequest(MISSING_USER_ID.to_string())
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::NotFound => AppError::NotFound("Chat not found".to_string()),
            ChatError::UserNotFound => AppError::NotFound("User not found".to_string()),
            ChatError::EmptyTitle => AppError::BadRequest("Title cannot be empty".to_string()),
            ChatError::EmptyMessage => AppError::BadRequest("Message cannot be empty".to_string()),
            ChatError::Repository(e) => e.into(),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound => AppError::NotFound("Profile not found".to_string()),
            ProfileError::Repository(e) => e.into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("Not found".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
