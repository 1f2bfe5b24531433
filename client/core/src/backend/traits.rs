//! Chat Backend Traits
//!
//! The remote inference endpoint is reached through the [`ChatBackend`]
//! trait, so the controller can be driven by the HTTP client in production
//! and by a scripted mock in tests.
//!
//! # Design Philosophy
//!
//! A request is atomic from the client's point of view: one question in,
//! one [`ChatReply`] or one [`BackendError`] out. There is no streaming,
//! no retry and no authentication.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outbound chat request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's question, as typed
    pub question: String,
}

impl ChatRequest {
    /// Create a request for a question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// When one word of a spoken reply is audible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The spoken token
    pub word: String,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
}

/// Successful response from the chat endpoint
#[derive(Clone, Debug, PartialEq)]
pub enum ChatReply {
    /// Plain text reply
    Text {
        /// Answer text
        answer: String,
        /// Provider usage limit was hit; `answer` is the server's notice
        quota_exceeded: bool,
    },
    /// Reply with a synthesized speech track
    Spoken {
        /// Plain reply text
        text: String,
        /// Decoded MPEG audio bytes
        audio: Vec<u8>,
        /// Word-level sync data
        word_timings: Vec<WordTiming>,
    },
}

impl ChatReply {
    /// Create a plain text reply
    pub fn text(answer: impl Into<String>) -> Self {
        Self::Text {
            answer: answer.into(),
            quota_exceeded: false,
        }
    }

    /// Create a quota-exceeded reply
    pub fn quota(notice: impl Into<String>) -> Self {
        Self::Text {
            answer: notice.into(),
            quota_exceeded: true,
        }
    }

    /// Text to store in the conversation
    pub fn content(&self) -> &str {
        match self {
            Self::Text { answer, .. } => answer,
            Self::Spoken { text, .. } => text,
        }
    }

    /// Playback length implied by the word timings, if any
    pub fn duration_hint(&self) -> Option<f64> {
        match self {
            Self::Spoken { word_timings, .. } => word_timings
                .iter()
                .map(|t| t.end)
                .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end)))),
            Self::Text { .. } => None,
        }
    }
}

/// Chat backend errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status
    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    /// Response body was not the expected JSON
    #[error("malformed response: {0}")]
    Malformed(String),

    /// No response within the client-side timeout
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Chat backend trait
///
/// Implement this trait to point the controller at a different endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Send one question and wait for the complete reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_hint_is_last_end() {
        let reply = ChatReply::Spoken {
            text: "a b".into(),
            audio: vec![],
            word_timings: vec![
                WordTiming {
                    word: "a".into(),
                    start: 0.0,
                    end: 0.4,
                },
                WordTiming {
                    word: "b".into(),
                    start: 0.4,
                    end: 1.25,
                },
            ],
        };
        assert_eq!(reply.duration_hint(), Some(1.25));
        assert_eq!(reply.content(), "a b");
        assert_eq!(ChatReply::text("x").duration_hint(), None);
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(ChatRequest::new("Who is Alice?")).unwrap();
        assert_eq!(json, serde_json::json!({ "question": "Who is Alice?" }));
    }
}
