//! Normalized events produced by the model relay.

use serde::{Deserialize, Serialize};

/// One event of a streamed model reply.
///
/// A reply is zero or more `Content` events followed by exactly one terminal
/// event, `Done` or `Error`. Nothing follows a terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum RelayEvent {
    /// A chunk of generated text.
    Content(String),
    /// The upstream call failed; the message is shown to the user.
    Error(String),
    /// The model finished its reply.
    Done,
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Content(_))
    }
}
