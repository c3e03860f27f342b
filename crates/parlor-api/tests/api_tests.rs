//! End-to-end tests of the HTTP surface against a temporary database and a
//! scripted model.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures_util::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use parlor_api::http::router::build_router;
use parlor_api::state::AppState;
use parlor_core::relay::{ChatModel, RelayStream};
use parlor_infra::sqlite::pool::DatabasePool;
use parlor_types::chat::{Message, MessageRole};
use parlor_types::config::AppConfig;
use parlor_types::relay::RelayEvent;

/// A model that replays a fixed event script and records what it was sent.
struct ScriptedModel {
    script: Vec<RelayEvent>,
    calls: Mutex<Vec<(Vec<Message>, String)>>,
}

impl ScriptedModel {
    fn new(script: Vec<RelayEvent>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Vec<Message>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "test-model"
    }

    fn stream_chat(
        &self,
        history: Vec<Message>,
        profile_fragment: String,
        _cancel: CancellationToken,
    ) -> RelayStream {
        self.calls.lock().unwrap().push((history, profile_fragment));
        Box::pin(futures_util::stream::iter(self.script.clone()))
    }
}

/// A model that sends one chunk and then waits until the turn is cancelled.
#[derive(Default)]
struct StalledModel {
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ChatModel for StalledModel {
    fn name(&self) -> &str {
        "stalled"
    }

    fn model(&self) -> &str {
        "test-model"
    }

    fn stream_chat(
        &self,
        _history: Vec<Message>,
        _profile_fragment: String,
        cancel: CancellationToken,
    ) -> RelayStream {
        self.tokens.lock().unwrap().push(cancel.clone());
        Box::pin(async_stream::stream! {
            yield RelayEvent::Content("partial".into());
            cancel.cancelled().await;
            yield RelayEvent::Error("Error: Request cancelled.".into());
        })
    }
}

struct TestApp {
    router: Router,
    model: Arc<ScriptedModel>,
    _dir: tempfile::TempDir,
}

async fn app_with(script: Vec<RelayEvent>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::open(&dir.path().join("parlor.db")).await.unwrap();
    let model = ScriptedModel::new(script);
    let state = AppState::with_model(
        dir.path().to_path_buf(),
        AppConfig::default(),
        pool,
        model.clone(),
    )
    .await
    .unwrap();
    TestApp {
        router: build_router(state),
        model,
        _dir: dir,
    }
}

async fn app() -> TestApp {
    app_with(vec![
        RelayEvent::Content("Hello".into()),
        RelayEvent::Content(" there".into()),
        RelayEvent::Done,
    ])
    .await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// POST /api/chat and return the `data:` payloads of the SSE frames.
    async fn chat(&self, body: Value) -> (StatusCode, Vec<String>) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        let text = String::from_utf8(bytes).unwrap();
        let frames = text
            .lines()
            .filter_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
            .map(|data| data.trim().to_string())
            .collect();
        (status, frames)
    }
}
#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = app.json("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_chat_streams_frames_and_stores_reply() {
    let app = app().await;

    let (status, frames) = app
        .chat(json!({"user_id": "u1", "message": "Tell me something nice today please"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        frames,
        vec![
            r#"{"type":"content","content":"Hello"}"#,
            r#"{"type":"content","content":" there"}"#,
            r#"{"type":"done"}"#,
            "[DONE]",
        ]
    );

    let (_, chats) = app.json("GET", "/api/chats?user_id=u1", None).await;
    let chats = chats.as_object().unwrap();
    assert_eq!(chats.len(), 1);
    let (chat_id, chat) = chats.iter().next().unwrap();
    assert_eq!(chat["title"], "Tell me something nice toda...");

    let (_, messages) = app
        .json("GET", &format!("/api/chats/{chat_id}/messages?user_id=u1"), None)
        .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], "Hello there");
}

#[tokio::test]
async fn test_chat_continues_existing_chat_with_profile() {
    let app = app().await;
    app.json(
        "POST",
        "/api/profile?user_id=u1",
        Some(json!({"name": "Asha", "ai_tone": "casual"})),
    )
    .await;
    let (_, created) = app
        .json("POST", "/api/chats", Some(json!({"user_id": "u1"})))
        .await;
    let chat_id = created["chat_id"].as_str().unwrap().to_string();

    app.chat(json!({"user_id": "u1", "chat_id": chat_id, "message": "first"}))
        .await;
    app.chat(json!({"user_id": "u1", "chat_id": chat_id, "message": "second"}))
        .await;

    let calls = app.model.calls();
    assert_eq!(calls.len(), 2);
    let (history, fragment) = &calls[1];
    let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
    );
    assert_eq!(history[2].content, "second");
    assert!(fragment.starts_with("The user's name is Asha."));
}

#[tokio::test]
async fn test_chat_error_stream_stores_nothing() {
    let app = app_with(vec![
        RelayEvent::Content("partial".into()),
        RelayEvent::Error("Error: Request to Ollama timed out.".into()),
    ])
    .await;

    let (status, frames) = app.chat(json!({"user_id": "u1", "message": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        frames,
        vec![
            r#"{"type":"content","content":"partial"}"#,
            r#"{"type":"error","content":"Error: Request to Ollama timed out."}"#,
            "[DONE]",
        ]
    );

    let (_, chats) = app.json("GET", "/api/chats?user_id=u1", None).await;
    let chat_id = chats.as_object().unwrap().keys().next().unwrap().clone();
    let (_, messages) = app
        .json("GET", &format!("/api/chats/{chat_id}/messages?user_id=u1"), None)
        .await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_validation() {
    let app = app().await;

    let (status, body) = app.json("POST", "/api/chat", Some(json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing user_id or message");

    let (status, _) = app
        .json("POST", "/api/chat", Some(json!({"user_id": "u1", "message": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            "POST",
            "/api/chat",
            Some(json!({"user_id": "u1", "chat_id": "nope", "message": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Chat not found");
    assert!(app.model.calls().is_empty());
}

#[tokio::test]
async fn test_chat_trims_padded_user_id() {
    let app = app().await;

    let (status, _) = app.chat(json!({"user_id": " u1 ", "message": "hi"})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, chats) = app.json("GET", "/api/chats?user_id=u1", None).await;
    let chats = chats.as_object().unwrap();
    assert_eq!(chats.len(), 1);
    let chat_id = chats.keys().next().unwrap();
    let (status, messages) = app
        .json("GET", &format!("/api/chats/{chat_id}/messages?user_id=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_disconnect_cancels_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::open(&dir.path().join("parlor.db")).await.unwrap();
    let model = Arc::new(StalledModel::default());
    let state = AppState::with_model(
        dir.path().to_path_buf(),
        AppConfig::default(),
        pool,
        model.clone(),
    )
    .await
    .unwrap();
    let shutdown = state.shutdown.clone();
    let router = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"user_id": "u1", "message": "hi"}).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&first).contains("partial"));

    let token = model.tokens.lock().unwrap()[0].clone();
    assert!(!token.is_cancelled());

    drop(body);
    tokio::time::timeout(Duration::from_secs(1), token.cancelled())
        .await
        .expect("turn token not cancelled after disconnect");
    assert!(!shutdown.is_cancelled());
}

#[tokio::test]
async fn test_chat_crud() {
    let app = app().await;

    let (status, body) = app.json("GET", "/api/chats", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing user_id");

    let (status, created) = app
        .json("POST", "/api/chats", Some(json!({"user_id": "u1"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "success");
    assert_eq!(created["title"], "New Chat");
    let chat_id = created["chat_id"].as_str().unwrap().to_string();

    let (status, message) = app
        .json(
            "POST",
            &format!("/api/chats/{chat_id}/messages"),
            Some(json!({"user_id": "u1", "role": "system", "content": "be brief"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["role"], "system");

    let (status, _) = app
        .json(
            "POST",
            &format!("/api/chats/{chat_id}/messages"),
            Some(json!({"user_id": "u1", "role": "robot", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            "POST",
            "/api/chats/missing/messages",
            Some(json!({"user_id": "u1", "role": "user", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Chat not found");

    let title_uri = format!("/api/chats/{chat_id}/title");
    let (status, body) = app
        .json("PUT", &title_uri, Some(json!({"user_id": "u1", "title": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title cannot be empty");

    let (status, body) = app
        .json(
            "PUT",
            "/api/chats/missing/title",
            Some(json!({"user_id": "u1", "title": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to update chat title");

    let (status, body) = app
        .json("PUT", &title_uri, Some(json!({"user_id": "u1", "title": "  Renamed  "})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chat title updated successfully");
    let (_, chats) = app.json("GET", "/api/chats?user_id=u1", None).await;
    assert_eq!(chats[&chat_id]["title"], "Renamed");

    let delete_uri = format!("/api/chats/{chat_id}?user_id=u1");
    let (status, body) = app.json("DELETE", &delete_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chat deleted");
    let (status, body) = app.json("DELETE", &delete_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Chat not found");
}

#[tokio::test]
async fn test_delete_all_chats() {
    let app = app().await;

    let (status, body) = app.json("DELETE", "/api/chats?user_id=ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    for _ in 0..2 {
        app.json("POST", "/api/chats", Some(json!({"user_id": "u1", "title": "t"})))
            .await;
    }
    let (status, body) = app.json("DELETE", "/api/chats?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All chats deleted");

    let (_, chats) = app.json("GET", "/api/chats?user_id=u1", None).await;
    assert_eq!(chats, json!({}));
    let (status, _) = app.json("DELETE", "/api/chats?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = app().await;

    let (status, body) = app.json("GET", "/api/profile?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = app
        .json("PUT", "/api/profile?user_id=u1", Some(json!({"age": 30})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Profile not found");

    let (status, created) = app
        .json(
            "POST",
            "/api/profile",
            Some(json!({"user_id": "u1", "name": "Asha", "goals": ["run"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Asha");
    assert!(created.get("user_id").is_none());
    assert!(created["created_at"].is_string());

    let (_, updated) = app
        .json("PUT", "/api/profile?user_id=u1", Some(json!({"age": 30})))
        .await;
    assert_eq!(updated["name"], "Asha");
    assert_eq!(updated["age"], 30);

    let (status, body) = app.json("DELETE", "/api/profile?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile deleted");
    let (status, _) = app.json("DELETE", "/api/profile?user_id=u1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prompt_catalog() {
    let app = app().await;

    let (status, categories) = app.json("GET", "/api/prompts/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories: Vec<String> = serde_json::from_value(categories).unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0], "daily_life");

    let (_, catalog) = app.json("GET", "/api/prompts", None).await;
    assert_eq!(catalog.as_object().unwrap().len(), 6);

    let (_, prompts) = app
        .json("GET", "/api/prompts?category=daily_life", None)
        .await;
    assert_eq!(prompts.as_array().unwrap().len(), 3);
    assert_eq!(prompts, catalog["daily_life"]);

    let (status, unknown) = app.json("GET", "/api/prompts?category=nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, json!([]));
}
