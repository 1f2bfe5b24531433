//! Red Queen TUI - Terminal interface for the Red Queen chat client
//!
//! A full-screen surface over the headless `redqueen-core` controller.
//!
//! # Architecture
//!
//! - **App**: Event loop; turns key presses into controller calls
//! - **Screens**: Landing page, disclaimer, and the chat view
//! - **Compositor**: Layered rendering so dialogs and the avatar sit on top
//! - **Display**: Highlight markup and the reveal cursor as styled lines
//! - **Avatar**: The Red Queen hologram, idle or talking

pub mod app;
pub mod avatar;
pub mod compositor;
pub mod display;
pub mod screens;
pub mod theme;
pub mod ui_state;
pub mod widgets;

pub use app::App;
pub use ui_state::{Dialog, Focus, Screen, UiState};
