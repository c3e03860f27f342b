//! Shared domain types for Parlor.
//!
//! Chats, messages, user profiles, the prompt catalog, relay events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod profile;
pub mod prompt;
pub mod relay;
