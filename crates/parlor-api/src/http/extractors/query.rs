//! Query parameter extractors.

use serde::Deserialize;

use crate::http::error::AppError;

/// `?user_id=` on endpoints that identify the caller in the query string.
#[derive(Debug, Deserialize, Default)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// `?category=` on the prompt listing endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct PromptQuery {
    pub category: Option<String>,
}

/// First non-blank user id among the candidates, or 400 `Missing user_id`.
pub fn require_user_id<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Result<String, AppError> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(AppError::missing_user_id)
}
