//! SSE streaming chat endpoint.
//!
//! POST /api/chat
//!
//! Stores the user's message, relays the conversation to the model and
//! streams the reply as Server-Sent Events. Each frame is a JSON
//! [`RelayEvent`]:
//! - `{"type":"content","content":"..."}` incremental text
//! - `{"type":"done"}` reply complete
//! - `{"type":"error","content":"..."}` the turn failed
//!
//! A final `data: [DONE]` frame always closes the stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderName;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;

use parlor_core::chat::transcript::TurnTranscript;
use parlor_types::error::ChatError;
use parlor_types::relay::RelayEvent;

use crate::http::error::AppError;
use crate::http::extractors::query::require_user_id;
use crate::state::AppState;

const MISSING_FIELDS: &str = "Missing user_id or message";

/// Stream terminator understood by the web client.
const STREAM_END: &str = "[DONE]";

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: Option<String>,
    /// Existing chat to continue; if absent, a new chat is created.
    pub chat_id: Option<String>,
    pub message: Option<String>,
}

fn event_frame(event: &RelayEvent) -> Event {
    Event::default().data(serde_json::to_string(event).unwrap_or_default())
}

/// POST /api/chat - SSE streaming chat.
pub async fn stream_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id([body.user_id.as_deref()]).ok();
    let message = body.message.filter(|s| !s.trim().is_empty());
    let (Some(user_id), Some(message)) = (user_id, message) else {
        return Err(AppError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let turn = state
        .chat_service
        .begin_turn(&user_id, body.chat_id.as_deref(), &message)
        .await
        .map_err(|e| match e {
            ChatError::EmptyMessage => AppError::BadRequest(MISSING_FIELDS.to_string()),
            other => other.into(),
        })?;

    // Client disconnect drops the stream and the guard with it, which
    // cancels the upstream call. Server shutdown cancels the parent.
    let cancel = state.shutdown.child_token();
    let guard = cancel.clone().drop_guard();
    let mut events = state
        .model
        .stream_chat(turn.history, turn.profile_fragment, cancel);

    let chat_service = state.chat_service.clone();
    let chat_id = turn.chat_id;
    let span = tracing::info_span!(
        "chat_turn",
        user_id = %user_id,
        chat_id = %chat_id,
        new_chat = turn.created,
        model = state.model.model(),
    );

    let sse_stream = async_stream::stream! {
        let _guard = guard;
        let mut transcript = TurnTranscript::new();
        let mut terminal = None;

        while let Some(event) = events.next().await {
            transcript.observe(&event);
            if event.is_terminal() {
                terminal = Some(event);
                break;
            }
            yield Ok::<_, Infallible>(event_frame(&event));
        }

        // Persist before announcing completion.
        if let Err(e) = chat_service.complete_turn(&user_id, &chat_id, transcript).await {
            tracing::error!(parent: &span, error = %e, "Failed to store assistant reply");
        }

        match terminal {
            Some(event) => yield Ok(event_frame(&event)),
            None => tracing::warn!(parent: &span, "Relay ended without a terminal event"),
        }
        tracing::debug!(parent: &span, "Stream closed");
        yield Ok(Event::default().data(STREAM_END));
    };

    Ok((
        [(HeaderName::from_static("x-accel-buffering"), "no")],
        Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))),
    ))
}
