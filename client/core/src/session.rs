//! Session Model
//!
//! A session is a named conversation thread with an ordered message list.
//! Sessions are persisted as a whole (see [`crate::store`]); the JSON field
//! names here are the persisted schema (`createdAt`, `isLoading`).

use serde::{Deserialize, Serialize};

use crate::messages::{MessageId, MessageRole, SessionId};

/// Greeting every new session starts with
pub const GREETING: &str = "Hello! How can I help you today?";

/// Reply shown in place of the placeholder when the request fails
pub const ERROR_REPLY: &str = "Sorry, there was an error connecting to the AI.";

/// Reply shown when the endpoint answers without any text
pub const EMPTY_REPLY: &str = "Sorry, I couldn't generate a response.";

/// A message in a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Stable message ID (generated for legacy data that has none)
    #[serde(default)]
    pub id: MessageId,
    /// Who wrote this message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Whether this is a pending-response placeholder
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_loading: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            is_loading: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            content: content.into(),
            is_loading: false,
        }
    }

    /// Create an empty assistant placeholder awaiting a response
    pub fn placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            content: String::new(),
            is_loading: true,
        }
    }

    /// Whether this message was written by the user
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Whether this message was written by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

/// A conversation session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique, time-derived session ID
    pub id: SessionId,
    /// User-editable display name
    pub name: String,
    /// Conversation history
    pub messages: Vec<ChatMessage>,
    /// Creation time (RFC 3339)
    pub created_at: String,
}

impl Session {
    /// Create a new session seeded with the assistant greeting
    pub fn new(id: SessionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            messages: vec![ChatMessage::assistant(GREETING)],
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get message by ID
    pub fn get_message(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Position of a message in the list
    pub fn position_of(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }

    /// Whether a response placeholder is still waiting in this session
    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(|m| m.is_loading)
    }

    /// Creation time parsed back into a timestamp
    pub fn created(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(&self.created_at).ok()
    }
}
