//! OllamaRelay -- concrete [`ChatModel`] for a local Ollama server.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use parlor_core::relay::{ChatModel, RelayStream, build_messages};
use parlor_types::chat::Message;
use parlor_types::config::ModelConfig;

use super::streaming::create_ollama_stream;
use super::types::{OllamaChatRequest, OllamaError};

/// Streams chat replies from Ollama's `/api/chat` endpoint.
pub struct OllamaRelay {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaRelay {
    /// Create a relay from the model settings.
    ///
    /// The client's overall timeout bounds each whole upstream call, from
    /// connect through the last body byte.
    pub fn new(config: &ModelConfig) -> Result<Self, OllamaError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Replace the upstream timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, OllamaError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The request body for one turn: system message first, then history.
    pub fn build_request(&self, history: Vec<Message>, profile_fragment: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model.clone(),
            messages: build_messages(history, profile_fragment),
            stream: true,
        }
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, OllamaError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OllamaError::Unexpected(format!("failed to create HTTP client: {e}")))
}

impl ChatModel for OllamaRelay {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn stream_chat(
        &self,
        history: Vec<Message>,
        profile_fragment: String,
        cancel: CancellationToken,
    ) -> RelayStream {
        let body = self.build_request(history, &profile_fragment);
        let span = tracing::info_span!(
            "gen_ai.chat",
            gen_ai.system = self.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.messages = body.messages.len(),
            gen_ai.request.stream = true,
            gen_ai.response.chunks = tracing::field::Empty,
        );
        create_ollama_stream(self.client.clone(), self.url("/api/chat"), body, cancel, span)
    }
}
