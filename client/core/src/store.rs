//! Session Store
//!
//! Owns the ordered session collection and the "current session" pointer,
//! and is the only code that writes them to the [`KeyValueStore`].
//!
//! # Design Philosophy
//!
//! Every mutation computes a new collection and goes through [`SessionStore::save`],
//! which replaces the persisted value wholesale. There is no incremental
//! diffing: the collection is small and there is a single writer.
//!
//! Loading never fails. Corrupt or missing data yields an empty collection.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::messages::SessionId;
use crate::session::{ChatMessage, Session, ERROR_REPLY};
use crate::storage::{
    KeyValueStore, StorageError, KEY_CURRENT_SESSION, KEY_SESSIONS, KEY_SIDEBAR_OPEN,
};

/// The persisted session collection plus current pointer
pub struct SessionStore {
    /// Backing key-value store
    kv: Box<dyn KeyValueStore>,
    /// Sessions in creation order
    sessions: Vec<Session>,
    /// Active session (always references an existing session when set)
    current: Option<SessionId>,
    /// Largest millisecond value issued as a session ID
    last_issued_ms: u64,
}

impl SessionStore {
    /// Load the collection and resolve the current session
    ///
    /// Prefers the remembered current ID if it still exists, else the first
    /// session, else none.
    pub fn load(kv: Box<dyn KeyValueStore>) -> Self {
        let sessions = read_sessions(kv.as_ref());

        let remembered = match kv.get(KEY_CURRENT_SESSION) {
            Ok(value) => value.map(|v| SessionId(v.trim().to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read current session pointer");
                None
            }
        };

        let current = remembered
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .or_else(|| sessions.first().map(|s| s.id.clone()));

        let last_issued_ms = sessions
            .iter()
            .filter_map(|s| s.id.as_millis())
            .max()
            .unwrap_or(0);

        tracing::info!(
            sessions = sessions.len(),
            current = ?current.as_ref().map(SessionId::as_str),
            "Loaded chat sessions"
        );

        Self {
            kv,
            sessions,
            current,
            last_issued_ms,
        }
    }

    /// All sessions in creation order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// ID of the current session
    pub fn current_id(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    /// The current session
    pub fn current(&self) -> Option<&Session> {
        let id = self.current.as_ref()?;
        self.session(id)
    }

    /// Look up a session by ID
    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Replace the whole collection, persist it, and update memory
    ///
    /// In-memory state is updated even when persisting fails, so the UI
    /// keeps working; the error is returned for the caller to log.
    pub fn save(&mut self, sessions: Vec<Session>) -> Result<(), StorageError> {
        self.sessions = sessions;

        if let Some(ref id) = self.current {
            if !self.sessions.iter().any(|s| &s.id == id) {
                self.current = self.sessions.first().map(|s| s.id.clone());
                self.persist_current()?;
            }
        }

        let json = serde_json::to_string(&self.sessions)?;
        self.kv.set(KEY_SESSIONS, &json)
    }

    /// Create a session named `Chat <n+1>`, append it and make it current
    pub fn create_session(&mut self) -> Result<SessionId, StorageError> {
        let id = self.next_session_id();
        let session = Session::new(id.clone(), format!("Chat {}", self.sessions.len() + 1));

        let mut next = self.sessions.clone();
        next.push(session);
        self.current = Some(id.clone());
        self.save(next)?;
        self.persist_current()?;

        tracing::info!(session_id = %id, "Created chat session");
        Ok(id)
    }

    /// Make `id` current; returns `false` (pointer unchanged) for unknown IDs
    pub fn switch_session(&mut self, id: &SessionId) -> Result<bool, StorageError> {
        if self.session(id).is_none() {
            tracing::debug!(session_id = %id, "Ignoring switch to unknown session");
            return Ok(false);
        }
        self.current = Some(id.clone());
        self.persist_current()?;
        Ok(true)
    }

    /// Rename a session; blank names and unknown IDs are ignored
    pub fn rename_session(&mut self, id: &SessionId, new_name: &str) -> Result<bool, StorageError> {
        let name = new_name.trim();
        if name.is_empty() || self.session(id).is_none() {
            return Ok(false);
        }

        let next = self
            .sessions
            .iter()
            .map(|s| {
                if &s.id == id {
                    Session {
                        name: name.to_string(),
                        ..s.clone()
                    }
                } else {
                    s.clone()
                }
            })
            .collect();
        self.save(next)?;
        Ok(true)
    }

    /// Delete a session
    ///
    /// If it was current, the first remaining session becomes current, or
    /// none when the collection is now empty.
    pub fn delete_session(&mut self, id: &SessionId) -> Result<bool, StorageError> {
        if self.session(id).is_none() {
            return Ok(false);
        }

        let next: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| &s.id != id)
            .cloned()
            .collect();

        if self.current.as_ref() == Some(id) {
            self.current = next.first().map(|s| s.id.clone());
            self.persist_current()?;
        }
        self.save(next)?;

        tracing::info!(session_id = %id, remaining = self.sessions.len(), "Deleted chat session");
        Ok(true)
    }

    /// Replace one session's message list through a reducer function
    ///
    /// Returns `false` without writing when the session does not exist.
    pub fn update_messages<F>(&mut self, id: &SessionId, f: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&[ChatMessage]) -> Vec<ChatMessage>,
    {
        let Some(pos) = self.sessions.iter().position(|s| &s.id == id) else {
            return Ok(false);
        };

        let mut next = self.sessions.clone();
        next[pos].messages = f(&self.sessions[pos].messages);
        self.save(next)?;
        Ok(true)
    }

    /// Persisted sidebar visibility (defaults to open)
    pub fn sidebar_open(&self) -> bool {
        match self.kv.get(KEY_SIDEBAR_OPEN) {
            Ok(Some(value)) => value.trim() != "false",
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read sidebar flag");
                true
            }
        }
    }

    /// Persist sidebar visibility
    pub fn set_sidebar_open(&mut self, open: bool) -> Result<(), StorageError> {
        self.kv.set(KEY_SIDEBAR_OPEN, if open { "true" } else { "false" })
    }

    fn persist_current(&mut self) -> Result<(), StorageError> {
        match self.current {
            Some(ref id) => self.kv.set(KEY_CURRENT_SESSION, id.as_str()),
            None => self.kv.remove(KEY_CURRENT_SESSION),
        }
    }

    fn next_session_id(&mut self) -> SessionId {
        let now = now_ms();
        let ms = if now > self.last_issued_ms {
            now
        } else {
            self.last_issued_ms + 1
        };
        self.last_issued_ms = ms;
        SessionId::from_millis(ms)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Read the persisted collection, treating anything unreadable as empty
fn read_sessions(kv: &dyn KeyValueStore) -> Vec<Session> {
    let raw = match kv.get(KEY_SESSIONS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored sessions, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Session>>(&raw) {
        Ok(sessions) => sessions.into_iter().map(settle_orphans).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored sessions are malformed, starting empty");
            Vec::new()
        }
    }
}

/// Replace placeholders left by a request that never finished
///
/// No request survives a restart, so a stored placeholder would spin forever.
fn settle_orphans(mut session: Session) -> Session {
    for message in session.messages.iter_mut().filter(|m| m.is_loading) {
        tracing::warn!(
            session_id = %session.id,
            message_id = %message.id,
            "Placeholder from an unfinished request, marking it failed"
        );
        *message = ChatMessage {
            content: ERROR_REPLY.into(),
            is_loading: false,
            ..message.clone()
        };
    }
    session
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(ms).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn empty_store() -> SessionStore {
        SessionStore::load(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = empty_store();
        assert!(store.is_empty());
        assert!(store.current_id().is_none());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let kv = MemoryStore::with_entries([(KEY_SESSIONS, "{not json"), (KEY_CURRENT_SESSION, "1")]);
        let store = SessionStore::load(Box::new(kv));
        assert!(store.is_empty());
        assert!(store.current_id().is_none());
    }

    #[test]
    fn test_load_settles_unfinished_placeholder() {
        let raw = r#"[{"id":"1","name":"Chat 1","createdAt":"2026-01-01T00:00:00Z","messages":[
            {"role":"user","content":"Who is Alice?"},
            {"role":"assistant","content":"","isLoading":true}
        ]}]"#;
        let kv = MemoryStore::with_entries([(KEY_SESSIONS, raw), (KEY_CURRENT_SESSION, "1")]);
        let store = SessionStore::load(Box::new(kv));

        let session = store.current().unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "Who is Alice?");
        let last = session.messages.last().unwrap();
        assert!(!last.is_loading);
        assert_eq!(last.content, ERROR_REPLY);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_create_session_unique_and_seeded() {
        let mut store = empty_store();
        let mut ids = Vec::new();
        for _ in 0..25 {
            let id = store.create_session().unwrap();
            let session = store.session(&id).unwrap();
            assert!(!session.messages.is_empty());
            ids.push(id);
        }

        let mut deduped = ids.clone();
        deduped.sort_by(|a, b| a.0.cmp(&b.0));
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());

        assert_eq!(store.sessions()[0].name, "Chat 1");
        assert_eq!(store.sessions()[24].name, "Chat 25");
        assert_eq!(store.current_id(), ids.last());
    }

    #[test]
    fn test_switch_unknown_keeps_pointer() {
        let mut store = empty_store();
        let id = store.create_session().unwrap();
        assert!(!store.switch_session(&SessionId::from("missing")).unwrap());
        assert_eq!(store.current_id(), Some(&id));
    }

    #[test]
    fn test_switch_known_session() {
        let mut store = empty_store();
        let first = store.create_session().unwrap();
        let _second = store.create_session().unwrap();
        assert!(store.switch_session(&first).unwrap());
        assert_eq!(store.current_id(), Some(&first));
    }

    #[test]
    fn test_rename_rules() {
        let mut store = empty_store();
        let id = store.create_session().unwrap();

        assert!(!store.rename_session(&id, "   ").unwrap());
        assert_eq!(store.session(&id).unwrap().name, "Chat 1");

        assert!(store.rename_session(&id, "  Umbrella  ").unwrap());
        assert_eq!(store.session(&id).unwrap().name, "Umbrella");

        assert!(!store.rename_session(&SessionId::from("nope"), "x").unwrap());
    }

    #[test]
    fn test_delete_current_moves_to_first() {
        let mut store = empty_store();
        let a = store.create_session().unwrap();
        let b = store.create_session().unwrap();
        let c = store.create_session().unwrap();
        assert_eq!(store.current_id(), Some(&c));

        assert!(store.delete_session(&c).unwrap());
        assert_eq!(store.current_id(), Some(&a));

        // deleting a non-current session leaves the pointer alone
        assert!(store.delete_session(&b).unwrap());
        assert_eq!(store.current_id(), Some(&a));

        assert!(store.delete_session(&a).unwrap());
        assert!(store.current_id().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip_through_kv() {
        let kv = MemoryStore::new();
        let mut store = SessionStore::load(Box::new(kv));
        let first = store.create_session().unwrap();
        store.create_session().unwrap();
        store
            .update_messages(&first, |m| crate::reducer::append_user_and_placeholder(m, "hi"))
            .unwrap();
        store.switch_session(&first).unwrap();

        let saved = store.sessions().to_vec();
        let kv = store.kv;

        let reloaded = SessionStore::load(kv);
        assert_eq!(reloaded.sessions(), saved.as_slice());
        assert_eq!(reloaded.current_id(), Some(&first));
    }

    #[test]
    fn test_stale_pointer_falls_back_to_first() {
        let mut store = empty_store();
        let first = store.create_session().unwrap();
        let json = serde_json::to_string(store.sessions()).unwrap();

        let kv = MemoryStore::with_entries([(KEY_SESSIONS, json.as_str()), (KEY_CURRENT_SESSION, "gone")]);
        let reloaded = SessionStore::load(Box::new(kv));
        assert_eq!(reloaded.current_id(), Some(&first));
    }

    #[test]
    fn test_ids_stay_unique_after_reload() {
        let mut store = empty_store();
        let first = store.create_session().unwrap();
        let kv = store.kv;

        let mut reloaded = SessionStore::load(kv);
        let second = reloaded.create_session().unwrap();
        assert_ne!(first, second);
        assert!(second.as_millis() > first.as_millis());
    }

    #[test]
    fn test_update_messages_unknown_session() {
        let mut store = empty_store();
        let changed = store
            .update_messages(&SessionId::from("x"), |m| m.to_vec())
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_sidebar_flag_defaults_open() {
        let mut store = empty_store();
        assert!(store.sidebar_open());
        store.set_sidebar_open(false).unwrap();
        assert!(!store.sidebar_open());
        store.set_sidebar_open(true).unwrap();
        assert!(store.sidebar_open());
    }
}
