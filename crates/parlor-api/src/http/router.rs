//! Axum router configuration with middleware.
//!
//! API routes live under `/api/`. Middleware: CORS, tracing, gzip.
//!
//! When `server.static_dir` points at an existing directory, the built web
//! client is served from it. API routes take priority; unknown paths fall
//! through to its `index.html`.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat streaming
        .route("/chat", post(handlers::chat::stream_chat))
        // Chats
        .route(
            "/chats",
            get(handlers::chats::list_chats)
                .post(handlers::chats::create_chat)
                .delete(handlers::chats::delete_all_chats),
        )
        .route(
            "/chats/{chat_id}",
            axum::routing::delete(handlers::chats::delete_chat),
        )
        .route(
            "/chats/{chat_id}/messages",
            get(handlers::chats::get_messages).post(handlers::chats::append_message),
        )
        .route(
            "/chats/{chat_id}/title",
            put(handlers::chats::update_title),
        )
        // Profile
        .route(
            "/profile",
            get(handlers::profile::get_profile)
                .post(handlers::profile::create_profile)
                .put(handlers::profile::update_profile)
                .delete(handlers::profile::delete_profile),
        )
        // Prompt catalog
        .route("/prompts", get(handlers::prompts::get_prompts))
        .route(
            "/prompts/categories",
            get(handlers::prompts::get_categories),
        );

    let static_dir = state.config.server.static_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state);

    if let Some(dir) = static_dir.filter(|dir| dir.is_dir()) {
        let serve_dir = ServeDir::new(&dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %dir.display(), "Static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
