//! Identifiers and Roles
//!
//! Small value types shared by the store, the reducer and the controller.
//!
//! Messages carry a stable [`MessageId`] from the moment they are created, so
//! edits, deletes and late network responses address a message by identity
//! rather than by its current position in the list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a chat message
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a chat session
///
/// Session IDs are time-derived: the decimal rendering of a millisecond
/// timestamp. The store is responsible for keeping them unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Build a session ID from a millisecond timestamp
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.to_string())
    }

    /// Millisecond value this ID was derived from, if it is numeric
    #[must_use]
    pub fn as_millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Borrow the raw string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person at the keyboard
    User,
    /// The Red Queen
    Assistant,
}

/// Token identifying one in-flight chat request
///
/// Captured when the request is issued and carried back with the response,
/// so the result is applied to the session and placeholder it was issued
/// for, regardless of which session is current when it arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken {
    /// Monotonic request number (per controller)
    pub seq: u64,
    /// Session the request was issued from
    pub session_id: SessionId,
    /// The loading placeholder that will receive the answer
    pub placeholder_id: MessageId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_round_trips_millis() {
        let id = SessionId::from_millis(1_717_000_000_123);
        assert_eq!(id.as_str(), "1717000000123");
        assert_eq!(id.as_millis(), Some(1_717_000_000_123));
        assert_eq!(SessionId::from("abc").as_millis(), None);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::from_str::<MessageRole>("\"assistant\"").unwrap(),
            MessageRole::Assistant
        );
    }
}
