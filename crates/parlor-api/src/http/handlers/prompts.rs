//! Prompt catalog HTTP handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use crate::http::error::AppError;
use crate::http::extractors::query::PromptQuery;
use crate::state::AppState;

/// GET /api/prompts - The whole catalog, or one category's prompts with
/// `?category=` (`[]` for an unknown category).
pub async fn get_prompts(
    State(state): State<AppState>,
    Query(query): Query<PromptQuery>,
) -> Result<Response, AppError> {
    match query.category {
        Some(category) => Ok(Json(state.prompt_service.prompts_in(&category).await?).into_response()),
        None => Ok(Json(state.prompt_service.catalog().await?).into_response()),
    }
}

/// GET /api/prompts/categories - Category names in catalog order.
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.prompt_service.categories().await?))
}
