//! Ollama wire types and error classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use parlor_types::chat::Message;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

/// One line of a streamed `/api/chat` reply.
///
/// Every field is optional so partial or unexpected objects still decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaChunk {
    #[serde(default)]
    pub message: Option<OllamaChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaChunkMessage {
    #[serde(default)]
    pub content: String,
}

/// Failures of an upstream call. `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("Error: Request to Ollama timed out.")]
    Timeout,

    #[error("Error connecting to Ollama: {0}")]
    Connection(String),

    #[error("Error from Ollama: {0}")]
    Upstream(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    #[error("Error: Request cancelled.")]
    Cancelled,
}

impl From<reqwest::Error> for OllamaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OllamaError::Timeout
        } else if e.is_builder() {
            OllamaError::Unexpected(e.to_string())
        } else {
            OllamaError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_types::chat::MessageRole;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = OllamaChatRequest {
            model: "llama3.1:8b".to_string(),
            messages: vec![
                Message::new(MessageRole::System, "You are a helpful AI assistant."),
                Message::new(MessageRole::User, "hi"),
            ],
            stream: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "llama3.1:8b",
                "messages": [
                    {"role": "system", "content": "You are a helpful AI assistant."},
                    {"role": "user", "content": "hi"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn test_chunk_tolerates_missing_fields() {
        let chunk: OllamaChunk = serde_json::from_str(r#"{"model":"x"}"#).unwrap();
        assert!(chunk.message.is_none());
        assert!(!chunk.done);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(OllamaError::Timeout.to_string(), "Error: Request to Ollama timed out.");
        assert_eq!(
            OllamaError::Connection("refused".into()).to_string(),
            "Error connecting to Ollama: refused"
        );
        assert_eq!(
            OllamaError::Unexpected("boom".into()).to_string(),
            "An unexpected error occurred: boom"
        );
    }
}
