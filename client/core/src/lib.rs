//! Red Queen Core - Headless Chat Client
//!
//! This crate holds everything the Red Queen chat client does apart from
//! drawing: the persisted session collection, the message reducer, the
//! send/edit state machine, reply animations and the HTTP backend. It can
//! drive the terminal UI or run headless in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Surface (redqueen-tui)                  │
//! │   key events ──▶ controller calls    controller state ──▶ draw│
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────┐
//! │                        REDQUEEN CORE                         │
//! │  ┌────────────────────────────┴───────────────────────────┐  │
//! │  │                    ChatController                      │  │
//! │  │  ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐  │  │
//! │  │  │SessionStore│ │ Animator │ │  Audio   │ │ Backend │  │  │
//! │  │  │ + reducer  │ │          │ │  player  │ │ (HTTP)  │  │  │
//! │  │  └─────┬──────┘ └──────────┘ └──────────┘ └─────────┘  │  │
//! │  └────────┼───────────────────────────────────────────────┘  │
//! │           ▼                                                  │
//! │     KeyValueStore (chatSessions, currentSessionId, ...)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use redqueen_core::{
//!     load_config, ChatController, ClockPlayer, ControllerConfig, FileStore,
//!     HttpChatBackend, SessionStore,
//! };
//!
//! let config = load_config()?;
//! let store = SessionStore::load(Box::new(FileStore::open(&config.data_dir)?));
//! let backend = HttpChatBackend::from_config(&config)?;
//! let mut controller = ChatController::new(
//!     backend,
//!     store,
//!     Box::new(ClockPlayer::new()),
//!     ControllerConfig::from_client_config(&config),
//! );
//!
//! controller.set_input("Who is Alice?");
//! controller.submit();
//!
//! loop {
//!     let now = std::time::Instant::now();
//!     controller.poll_responses(now);
//!     controller.tick(now);
//!     // render controller state
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: Character reveal and spoken-word highlight
//! - [`audio`]: Audio player seam for spoken replies
//! - [`backend`]: Chat endpoint abstraction and HTTP client
//! - [`config`]: TOML/env/CLI configuration
//! - [`controller`]: Send/edit state machine
//! - [`messages`]: Identifiers and roles
//! - [`reducer`]: Pure message-list transformations
//! - [`session`]: Session and message model
//! - [`storage`]: Key-value persistence
//! - [`store`]: Session collection and current pointer
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod audio;
pub mod backend;
pub mod config;
pub mod controller;
pub mod messages;
pub mod reducer;
pub mod session;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use animation::{MessageAnimator, TypingReveal, WordHighlight, MARK_CLOSE, MARK_OPEN};
pub use audio::{AudioError, AudioPlayer, ClockPlayer, CommandPlayer};
pub use backend::{
    BackendError, ChatBackend, ChatReply, ChatRequest, HttpChatBackend, WordTiming,
};
pub use controller::{
    AnimationKind, AppliedResponse, ChatController, ControllerConfig, EditDraft, IgnoreReason,
    ResponseOutcome, SubmitOutcome,
};
pub use messages::{MessageId, MessageRole, RequestToken, SessionId};
pub use session::{ChatMessage, Session, EMPTY_REPLY, ERROR_REPLY, GREETING};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::SessionStore;

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ClientToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
