//! Chat Backend Integration
//!
//! Access to the remote chat endpoint through a common trait, so the
//! controller can run against the real service or a test double.
//!
//! # Usage
//!
//! ```ignore
//! use redqueen_core::backend::{ChatBackend, ChatRequest, HttpChatBackend};
//!
//! let backend = HttpChatBackend::from_config(&config)?;
//! let reply = backend.send(&ChatRequest::new("Who is Alice?")).await?;
//! ```

mod http;
mod traits;

pub use http::{parse_reply, HttpChatBackend};
pub use traits::{BackendError, ChatBackend, ChatReply, ChatRequest, WordTiming};
