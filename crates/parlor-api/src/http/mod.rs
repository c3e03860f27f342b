//! HTTP API layer for Parlor.
//!
//! Axum-based JSON API under `/api/` with an SSE chat endpoint, CORS, and
//! optional static serving of a built frontend.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
