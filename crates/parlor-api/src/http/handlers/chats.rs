//! Chat CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/chats                      - All chats of a user, keyed by id
//! - POST   /api/chats                      - Create an empty chat
//! - DELETE /api/chats                      - Delete all chats of a user
//! - GET    /api/chats/{chat_id}/messages   - Messages of a chat
//! - POST   /api/chats/{chat_id}/messages   - Append a message
//! - PUT    /api/chats/{chat_id}/title      - Rename a chat
//! - DELETE /api/chats/{chat_id}            - Delete a chat

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use parlor_types::chat::{ChatIndex, ChatMessage, MessageRole};
use parlor_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::query::{UserQuery, require_user_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
}

/// GET /api/chats - All chats of a user.
pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ChatIndex>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    Ok(Json(state.chat_service.list_chats(&user_id).await?))
}

/// POST /api/chats - Create an empty chat.
pub async fn create_chat(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = require_user_id([body.user_id.as_deref(), query.user_id.as_deref()])?;
    let chat = state
        .chat_service
        .create_chat(&user_id, body.title.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "chat_id": chat.id,
            "title": chat.title,
        })),
    ))
}

/// DELETE /api/chats - Delete every chat of a user.
pub async fn delete_all_chats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    state.chat_service.delete_all_chats(&user_id).await?;
    Ok(Json(json!({ "message": "All chats deleted" })))
}

/// GET /api/chats/{chat_id}/messages - Messages in append order.
///
/// An unknown chat has no messages.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    Ok(Json(state.chat_service.get_messages(&user_id, &chat_id).await?))
}

/// POST /api/chats/{chat_id}/messages - Append a message to a chat.
pub async fn append_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<UserQuery>,
    Json(body): Json<AppendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let user_id = require_user_id([body.user_id.as_deref(), query.user_id.as_deref()])?;
    let role: MessageRole = body
        .role
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing role".to_string()))?
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;
    let content = body
        .content
        .ok_or_else(|| AppError::BadRequest("Missing content".to_string()))?;

    let message = state
        .chat_service
        .append_message(&user_id, &chat_id, role, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PUT /api/chats/{chat_id}/title - Rename a chat.
pub async fn update_title(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<UserQuery>,
    Json(body): Json<UpdateTitleRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user_id([body.user_id.as_deref(), query.user_id.as_deref()])?;
    state
        .chat_service
        .rename_chat(&user_id, &chat_id, &body.title)
        .await
        .map_err(|e| match e {
            ChatError::NotFound => AppError::BadRequest("Failed to update chat title".to_string()),
            other => other.into(),
        })?;
    Ok(Json(json!({ "message": "Chat title updated successfully" })))
}

/// DELETE /api/chats/{chat_id} - Delete one chat.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user_id([query.user_id.as_deref()])?;
    state.chat_service.delete_chat(&user_id, &chat_id).await?;
    Ok(Json(json!({ "message": "Chat deleted" })))
}
