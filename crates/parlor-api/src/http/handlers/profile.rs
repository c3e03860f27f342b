//! Profile HTTP handlers.
//!
//! The caller is identified by `?user_id=` or a `user_id` key in the body.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use parlor_types::profile::{Profile, ProfileFields};

use crate::http::error::AppError;
use crate::http::extractors::query::{UserQuery, require_user_id};
use crate::state::AppState;

fn body_user_id(fields: &ProfileFields) -> Option<&str> {
    fields.get("user_id").and_then(Value::as_str)
}

/// GET /api/profile - The stored profile, or `{}` when there is none.
pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    let profile = state.profile_service.get_profile(&user_id).await?;
    let body = match profile {
        Some(profile) => serde_json::to_value(&profile)
            .map_err(|e| AppError::Internal(format!("failed to serialize profile: {e}")))?,
        None => json!({}),
    };
    Ok(Json(body))
}

/// POST /api/profile - Create or replace a profile.
pub async fn create_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref(), body_user_id(&fields)])?;
    let profile = state.profile_service.create_profile(&user_id, fields).await?;
    Ok(Json(profile))
}

/// PUT /api/profile - Merge fields into an existing profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<Profile>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref(), body_user_id(&fields)])?;
    let profile = state.profile_service.update_profile(&user_id, fields).await?;
    Ok(Json(profile))
}

/// DELETE /api/profile - Delete a profile.
pub async fn delete_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    state.profile_service.delete_profile(&user_id).await?;
    Ok(Json(json!({ "message": "Profile deleted" })))
}
