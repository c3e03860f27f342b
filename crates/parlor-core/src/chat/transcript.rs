//! Assembly of the assistant reply from a stream of relay events.

use parlor_types::relay::RelayEvent;

/// Collects `Content` text until the reply terminates.
#[derive(Debug, Default)]
pub struct TurnTranscript {
    text: String,
    chunks: usize,
    outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Failed,
}

impl TurnTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event. Events after a terminal one are ignored.
    pub fn observe(&mut self, event: &RelayEvent) {
        if self.outcome.is_some() {
            return;
        }
        match event {
            RelayEvent::Content(text) => {
                self.text.push_str(text);
                self.chunks += 1;
            }
            RelayEvent::Done => self.outcome = Some(Outcome::Done),
            RelayEvent::Error(_) => self.outcome = Some(Outcome::Failed),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The reply to persist: only a completed, non-blank one.
    pub fn into_reply(self) -> Option<String> {
        match self.outcome {
            Some(Outcome::Done) if !self.text.trim().is_empty() => Some(self.text),
            _ => None,
        }
    }
}
