//! Local Key-Value Storage
//!
//! The client persists everything through a tiny string key-value store,
//! modelled on browser local storage: whole values are replaced on every
//! write, and there is exactly one writer (this process).
//!
//! # Keys
//!
//! - [`KEY_SESSIONS`]: JSON array of sessions
//! - [`KEY_CURRENT_SESSION`]: plain string, the active session ID
//! - [`KEY_SIDEBAR_OPEN`]: `"true"` / `"false"`, UI-only

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized session collection
pub const KEY_SESSIONS: &str = "chatSessions";

/// Key holding the current session ID
pub const KEY_CURRENT_SESSION: &str = "currentSessionId";

/// Key holding the sidebar visibility flag
pub const KEY_SIDEBAR_OPEN: &str = "sidebarOpen";

/// Errors from a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem failure
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Key contains characters that cannot be stored
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Value could not be serialized
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value store
///
/// Implementations must make `set` atomic per key: a reader never observes a
/// half-written value.
pub trait KeyValueStore: Send {
    /// Read a value, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (replace) a value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value (absent keys are not an error)
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
