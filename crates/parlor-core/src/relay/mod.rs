//! Model relay contract.
//!
//! A `ChatModel` takes the conversation so far plus a profile fragment and
//! produces a lazy stream of [`RelayEvent`]s. Failures are events, never
//! errors: the stream always ends with exactly one `Done` or `Error`.
//!
//! The trait returns a boxed stream so implementations can be held as
//! `Arc<dyn ChatModel>` and swapped for scripted models in tests.

use std::pin::Pin;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use parlor_types::chat::{Message, MessageRole};
use parlor_types::relay::RelayEvent;

/// Fixed instruction at the head of every system prompt.
pub const BASE_INSTRUCTION: &str = "You are a helpful AI assistant.";

/// Stream of normalized relay events.
pub type RelayStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send + 'static>>;

/// Trait for upstream chat models.
///
/// Implementations live in parlor-infra (e.g., `OllamaRelay`).
pub trait ChatModel: Send + Sync {
    /// Provider name for logs and spans (e.g., "ollama").
    fn name(&self) -> &str;

    /// Model identifier sent upstream.
    fn model(&self) -> &str;

    /// Start a streamed reply.
    ///
    /// `history` is sent unmodified after a synthetic system message built by
    /// [`system_prompt`]. Cancelling `cancel` stops the upstream read loop;
    /// the stream then ends with an `Error` event.
    fn stream_chat(
        &self,
        history: Vec<Message>,
        profile_fragment: String,
        cancel: CancellationToken,
    ) -> RelayStream;
}

/// Build the system prompt: the base instruction, then the profile fragment
/// separated by one space when it is non-empty.
pub fn system_prompt(profile_fragment: &str) -> String {
    let fragment = profile_fragment.trim();
    if fragment.is_empty() {
        BASE_INSTRUCTION.to_string()
    } else {
        format!("{BASE_INSTRUCTION} {fragment}")
    }
}

/// Prepend the system message to the history.
pub fn build_messages(history: Vec<Message>, profile_fragment: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::new(MessageRole::System, system_prompt(profile_fragment)));
    messages.extend(history);
    messages
}
