//! Shared UI State
//!
//! Everything the renderers need that is not chat state: which screen is
//! up, where keyboard focus is, what is selected and which dialog is open.
//! The [`App`](crate::App) owns one `UiState` and passes it to every
//! renderer explicitly.

use redqueen_core::{MessageId, SessionId};

/// Top-level screens
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Title screen
    Landing,
    /// Legal notice
    Disclaimer,
    /// Sidebar, conversation and input bar
    Chat,
}

/// Which pane receives keys on the chat screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    /// The input bar and message list
    Chat,
    /// The session list
    Sidebar,
}

/// Entries of the per-session menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    /// Open the rename dialog
    Rename,
    /// Open the delete confirmation
    Delete,
    /// Dismiss the menu
    Close,
}

impl MenuItem {
    /// All entries in display order
    pub const ALL: [MenuItem; 3] = [MenuItem::Rename, MenuItem::Delete, MenuItem::Close];

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Self::Rename => "Rename",
            Self::Delete => "Delete",
            Self::Close => "Close",
        }
    }
}

/// Modal dialogs drawn above the chat screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dialog {
    /// Rename / Delete / Close for one session
    SessionMenu {
        /// Session the menu acts on
        session_id: SessionId,
        /// Highlighted entry
        selected: usize,
    },
    /// "Delete Chat Session" confirmation
    ConfirmDelete {
        /// Session to delete
        session_id: SessionId,
    },
    /// Rename text field
    Rename {
        /// Session to rename
        session_id: SessionId,
        /// Field contents, prefilled with the current name
        draft: String,
    },
}

/// UI state owned by the app
#[derive(Clone, Debug)]
pub struct UiState {
    /// Screen currently shown
    pub screen: Screen,
    /// Screen to return to from the disclaimer
    pub previous_screen: Option<Screen>,
    /// Keyboard focus on the chat screen
    pub focus: Focus,
    /// Highlighted row in the session list
    pub sidebar_selected: usize,
    /// Message selected for edit/delete
    pub selected_message: Option<MessageId>,
    /// Conversation scroll (lines from the bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Open modal dialog
    pub dialog: Option<Dialog>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Landing,
            previous_screen: None,
            focus: Focus::Chat,
            sidebar_selected: 0,
            selected_message: None,
            scroll_offset: 0,
            dialog: None,
        }
    }
}

impl UiState {
    /// Start on the landing screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Go to `screen`, remembering where we came from
    pub fn navigate(&mut self, screen: Screen) {
        if self.screen != screen {
            self.previous_screen = Some(self.screen);
            self.screen = screen;
        }
    }

    /// Return to the previous screen (landing if there is none)
    pub fn back(&mut self) {
        self.screen = self.previous_screen.take().unwrap_or(Screen::Landing);
    }

    /// Swap focus between sidebar and chat
    ///
    /// Focus cannot move to a collapsed sidebar.
    pub fn toggle_focus(&mut self, sidebar_open: bool) {
        self.focus = match self.focus {
            Focus::Chat if sidebar_open => Focus::Sidebar,
            _ => Focus::Chat,
        };
    }

    /// Move the sidebar highlight, clamped to `count` rows
    pub fn move_sidebar_selection(&mut self, delta: isize, count: usize) {
        if count == 0 {
            self.sidebar_selected = 0;
            return;
        }
        let max = count - 1;
        self.sidebar_selected = self.sidebar_selected.saturating_add_signed(delta).min(max);
    }

    /// Forget selections tied to the conversation being shown
    pub fn reset_conversation_view(&mut self) {
        self.selected_message = None;
        self.scroll_offset = 0;
    }

    /// Whether a modal dialog has the keyboard
    pub fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }
}
