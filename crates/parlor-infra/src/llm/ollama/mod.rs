//! Ollama chat relay.
//!
//! [`OllamaRelay`] posts the conversation to `/api/chat` in streaming mode
//! and turns the newline-delimited JSON reply into relay events.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::OllamaRelay;
pub use types::OllamaError;
