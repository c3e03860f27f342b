//! Business logic and port definitions for Parlor.
//!
//! This crate defines the repository traits and the `ChatModel` relay trait
//! that the infrastructure layer implements, plus the pure pieces that sit
//! between them: the profile-to-prompt compiler and chat title generation.
//! It depends only on `parlor-types` -- never on `parlor-infra` or any
//! database/HTTP crate.

pub mod chat;
pub mod profile;
pub mod prompt;
pub mod relay;
