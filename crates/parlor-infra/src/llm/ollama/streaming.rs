//! Streamed `/api/chat` reply to [`RelayEvent`] adapter.
//!
//! The body arrives as arbitrary byte chunks. [`LineBuffer`] reassembles
//! lines across chunk boundaries and [`decode_line`] classifies each one.
//! Lines may carry an SSE-style `data: ` prefix and the stream may end with
//! a `[DONE]` sentinel; both plain NDJSON and that framing are accepted.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use parlor_core::relay::RelayStream;
use parlor_types::relay::RelayEvent;

use super::types::{OllamaChatRequest, OllamaChunk, OllamaError};

/// Terminal sentinel of SSE-framed replies.
const DONE_SENTINEL: &str = "[DONE]";

/// Why a line produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    InvalidUtf8,
    Malformed,
    NoContent,
}

/// Classification of one upstream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    Content(String),
    Done,
    /// The upstream reported an error inside an otherwise healthy stream.
    Failed(String),
    Skip(SkipReason),
}

/// Decode one line of the reply body.
pub fn decode_line(raw: &[u8]) -> DecodedLine {
    let Ok(line) = std::str::from_utf8(raw) else {
        return DecodedLine::Skip(SkipReason::InvalidUtf8);
    };
    let line = line.trim();
    let line = line.strip_prefix("data:").map(str::trim).unwrap_or(line);

    if line.is_empty() {
        return DecodedLine::Skip(SkipReason::Blank);
    }
    if line == DONE_SENTINEL {
        return DecodedLine::Done;
    }

    let chunk: OllamaChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(_) => return DecodedLine::Skip(SkipReason::Malformed),
    };

    if chunk.done {
        return DecodedLine::Done;
    }
    if let Some(error) = chunk.error {
        return DecodedLine::Failed(error);
    }
    match chunk.message {
        Some(message) if !message.content.is_empty() => DecodedLine::Content(message.content),
        _ => DecodedLine::Skip(SkipReason::NoContent),
    }
}

/// Reassembles newline-terminated lines from byte chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    /// Add a chunk and return every line it completed, without the newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            lines.push(self.pending[start..end].to_vec());
            start = end + 1;
            from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Take the unterminated tail, if any, once the body has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        (!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending))
    }
}

/// Open the streaming call and adapt the reply.
///
/// Every failure becomes a terminal `Error` event. A body that ends without
/// a completion marker is treated as complete.
pub fn create_ollama_stream(
    client: reqwest::Client,
    url: String,
    body: OllamaChatRequest,
    cancel: CancellationToken,
    span: tracing::Span,
) -> RelayStream {
    Box::pin(async_stream::stream! {
        let send = client.post(&url).json(&body).send();
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = send => Some(result),
        };

        let response = match sent.map(|r| r.and_then(|resp| resp.error_for_status())) {
            None => {
                debug!(parent: &span, "Cancelled before the upstream replied");
                yield RelayEvent::Error(OllamaError::Cancelled.to_string());
                return;
            }
            Some(Err(e)) => {
                let err = OllamaError::from(e);
                warn!(parent: &span, error = %err, "Upstream request failed");
                yield RelayEvent::Error(err.to_string());
                return;
            }
            Some(Ok(response)) => response,
        };

        let mut bytes = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut chunks: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                item = bytes.next() => Some(item),
            };
            let item = match next {
                Some(item) => item,
                None => {
                    debug!(parent: &span, chunks, "Cancelled mid-reply");
                    span.record("gen_ai.response.chunks", chunks);
                    yield RelayEvent::Error(OllamaError::Cancelled.to_string());
                    return;
                }
            };

            let completed = match item {
                Some(Ok(data)) => lines.push(&data),
                Some(Err(e)) => {
                    let err = OllamaError::from(e);
                    warn!(parent: &span, error = %err, chunks, "Upstream body failed");
                    span.record("gen_ai.response.chunks", chunks);
                    yield RelayEvent::Error(err.to_string());
                    return;
                }
                None => {
                    // A body that ends without a marker is a complete reply.
                    let mut tail: Vec<Vec<u8>> = lines.finish().into_iter().collect();
                    tail.push(DONE_SENTINEL.as_bytes().to_vec());
                    tail
                }
            };

            for line in completed {
                match decode_line(&line) {
                    DecodedLine::Content(text) => {
                        chunks += 1;
                        yield RelayEvent::Content(text);
                    }
                    DecodedLine::Done => {
                        span.record("gen_ai.response.chunks", chunks);
                        debug!(parent: &span, chunks, "Reply complete");
                        yield RelayEvent::Done;
                        return;
                    }
                    DecodedLine::Failed(message) => {
                        let err = OllamaError::Upstream(message);
                        warn!(parent: &span, error = %err, chunks, "Upstream reported an error");
                        span.record("gen_ai.response.chunks", chunks);
                        yield RelayEvent::Error(err.to_string());
                        return;
                    }
                    DecodedLine::Skip(reason) => {
                        debug!(parent: &span, ?reason, "Skipping upstream line");
                    }
                }
            }
        }
    })
}
