//! HTTP Chat Backend
//!
//! Talks to the Red Queen chat service over JSON-over-HTTP.
//!
//! # Endpoint
//!
//! `POST {base_url}/ai/chat/` with `{"question": "..."}`. The response is one of:
//! - `{"answer": "...", "quota_exceeded": true?}` for a plain text reply
//! - `{"text": "...", "audio": "<base64>", "word_timings": [...]}` for a spoken
//!   reply (other fields, such as `text_html`, are ignored)

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use super::traits::{BackendError, ChatBackend, ChatReply, ChatRequest, WordTiming};
use crate::config::ClientConfig;
use crate::session::EMPTY_REPLY;

/// HTTP chat backend client
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    /// Full chat endpoint URL
    endpoint: String,
    /// Request timeout the client was built with
    timeout: Duration,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for an endpoint URL
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            timeout,
            http_client,
        })
    }

    /// Create from the client configuration
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        Self::new(config.chat_url(), config.request_timeout)
    }

    /// Endpoint this backend posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        tracing::debug!(endpoint = %self.endpoint, "Sending chat request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Chat endpoint returned error status");
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        parse_reply(&body)
    }
}

impl HttpChatBackend {
    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

/// Raw response body (both reply shapes share one object)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReply {
    answer: Option<String>,
    quota_exceeded: Option<bool>,
    text: Option<String>,
    audio: Option<String>,
    word_timings: Option<Vec<WordTiming>>,
}

/// Parse a chat endpoint response body
///
/// A body that is not a JSON object is [`BackendError::Malformed`]. An
/// object carrying no usable text becomes [`EMPTY_REPLY`]. Audio that fails
/// to decode degrades to a text reply.
pub fn parse_reply(body: &str) -> Result<ChatReply, BackendError> {
    let raw: RawReply =
        serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;

    let text_or_empty = |candidates: [&Option<String>; 2]| -> String {
        candidates
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| EMPTY_REPLY.to_string())
    };

    if raw.quota_exceeded.unwrap_or(false) {
        return Ok(ChatReply::quota(text_or_empty([&raw.answer, &raw.text])));
    }

    if let (Some(audio), Some(word_timings)) = (&raw.audio, &raw.word_timings) {
        let text = text_or_empty([&raw.text, &raw.answer]);
        return match base64::engine::general_purpose::STANDARD.decode(audio.trim()) {
            Ok(bytes) => Ok(ChatReply::Spoken {
                text,
                audio: bytes,
                word_timings: word_timings.clone(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Audio payload failed to decode, showing text only");
                Ok(ChatReply::text(text))
            }
        };
    }

    Ok(ChatReply::text(text_or_empty([&raw.answer, &raw.text])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_answer() {
        let reply = parse_reply(r#"{"answer":"I am the Red Queen."}"#).unwrap();
        assert_eq!(reply, ChatReply::text("I am the Red Queen."));
    }

    #[test]
    fn test_parse_quota_exceeded() {
        let reply = parse_reply(r#"{"answer":"Hi","quota_exceeded":true}"#).unwrap();
        assert_eq!(reply, ChatReply::quota("Hi"));
    }

    #[test]
    fn test_parse_missing_text_uses_fallback() {
        assert_eq!(parse_reply("{}").unwrap(), ChatReply::text(EMPTY_REPLY));
        assert_eq!(
            parse_reply(r#"{"answer":"   "}"#).unwrap(),
            ChatReply::text(EMPTY_REPLY)
        );
    }

    #[test]
    fn test_parse_spoken_reply() {
        let audio = base64::engine::general_purpose::STANDARD.encode(b"ID3fake");
        let body = format!(
            r#"{{"text":"the cat","text_html":"<p>the cat</p>","audio":"{audio}",
                "word_timings":[{{"word":"the","start":0,"end":0.2}},{{"word":"cat","start":0.2,"end":0.5}}]}}"#
        );

        match parse_reply(&body).unwrap() {
            ChatReply::Spoken {
                text,
                audio,
                word_timings,
            } => {
                assert_eq!(text, "the cat");
                assert_eq!(audio, b"ID3fake".to_vec());
                assert_eq!(word_timings.len(), 2);
                assert_eq!(word_timings[1].word, "cat");
            }
            other => panic!("expected spoken reply, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_audio_degrades_to_text() {
        let body = r#"{"text":"hello","audio":"!!not base64!!","word_timings":[]}"#;
        assert_eq!(parse_reply(body).unwrap(), ChatReply::text("hello"));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_reply("<html>502</html>"),
            Err(BackendError::Malformed(_))
        ));
        assert!(matches!(parse_reply("[1,2]"), Err(BackendError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let backend =
            HttpChatBackend::new("http://127.0.0.1:9/ai/chat/", Duration::from_secs(2)).unwrap();
        let result = backend.send(&ChatRequest::new("Who is Alice?")).await;
        assert!(matches!(
            result,
            Err(BackendError::Transport(_) | BackendError::Timeout(_))
        ));
    }

    #[test]
    fn test_from_config_uses_chat_url() {
        let config = ClientConfig::default();
        let backend = HttpChatBackend::from_config(&config).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000/ai/chat/");
    }
}
