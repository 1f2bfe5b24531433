//! Chat Screen
//!
//! Sidebar (avatar, "New Chat", session list), the conversation, the input
//! bar, a status line and modal dialogs. Each region draws into its own
//! compositor layer; the functions here only read controller state.

use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use redqueen_core::animation::REVEAL_CURSOR;
use redqueen_core::{ChatBackend, ChatController, Session, SessionId};

use crate::display::{self, MessageView};
use crate::theme::{
    self, ASSISTANT_TEXT, DIM_GRAY, RQ_BLACK, RQ_RED, RQ_RED_DIM, RQ_SIDEBAR, USER_TEXT,
    WARNING_YELLOW,
};
use crate::ui_state::{Dialog, Focus, MenuItem, UiState};
use crate::widgets::Modal;

/// Input box height (lines), separator included
pub const INPUT_HEIGHT: u16 = 5;

/// Width of the expanded sidebar
pub const SIDEBAR_WIDTH: u16 = 30;

/// Width of the collapsed sidebar
pub const COLLAPSED_WIDTH: u16 = 9;

/// Rows reserved for the expanded avatar
const AVATAR_ROWS: u16 = 7;

/// First row of the session list
const LIST_TOP: u16 = AVATAR_ROWS + 4;

/// Rows per session entry (name, date)
const ENTRY_ROWS: u16 = 2;

/// Half-period of the placeholder's pulsing dot
const PULSE: Duration = Duration::from_millis(500);

/// Where each chat region goes on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatLayout {
    /// Sidebar panel
    pub sidebar: Rect,
    /// Avatar, on top of the sidebar
    pub avatar: Rect,
    /// Message list
    pub conversation: Rect,
    /// Compose box
    pub input: Rect,
    /// Bottom status line
    pub status: Rect,
}

/// Split the screen for the chat view
pub fn layout(area: Rect, sidebar_open: bool) -> ChatLayout {
    let body_height = area.height.saturating_sub(1);
    let side_width = if sidebar_open {
        SIDEBAR_WIDTH
    } else {
        COLLAPSED_WIDTH
    }
    .min(area.width);
    let main_width = area.width - side_width;
    let conversation_height = body_height.saturating_sub(INPUT_HEIGHT);

    let avatar = if sidebar_open {
        Rect::new(0, 1, side_width, AVATAR_ROWS.min(body_height.saturating_sub(1)))
    } else {
        Rect::new(0, 1, side_width, 4.min(body_height.saturating_sub(1)))
    };

    ChatLayout {
        sidebar: Rect::new(0, 0, side_width, body_height),
        avatar,
        conversation: Rect::new(side_width, 0, main_width, conversation_height),
        input: Rect::new(
            side_width,
            conversation_height,
            main_width,
            body_height - conversation_height,
        ),
        status: Rect::new(0, body_height, area.width, area.height - body_height),
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// Session entries that fit, scrolled so the highlighted one is visible
fn visible_entries(count: usize, selected: usize, rows: u16) -> std::ops::Range<usize> {
    let fit = usize::from((rows / ENTRY_ROWS).max(1));
    let start = (selected + 1).saturating_sub(fit);
    start..count.min(start + fit)
}

/// Draw the sidebar panel (expanded or collapsed)
pub fn render_sidebar(
    buf: &mut Buffer,
    sessions: &[Session],
    current: Option<&SessionId>,
    ui: &UiState,
    open: bool,
) {
    buf.reset();
    let area = buf.area;
    buf.set_style(area, Style::default().bg(RQ_SIDEBAR));
    if area.width < 4 || area.height < 2 {
        return;
    }

    if !open {
        let hint_y = area.height.saturating_sub(2).min(6);
        buf.set_string(1, hint_y, "» ^B", Style::default().fg(DIM_GRAY));
        return;
    }

    let width = usize::from(area.width.saturating_sub(2));
    buf.set_string(1, 0, "RED QUEEN", theme::title_style());

    let new_chat_y = AVATAR_ROWS + 1;
    if new_chat_y + 1 >= area.height {
        return;
    }
    buf.set_string(1, new_chat_y, "+ New Chat", Style::default().fg(RQ_RED));
    buf.set_string(
        area.width.saturating_sub(4),
        new_chat_y,
        "^N",
        Style::default().fg(DIM_GRAY),
    );
    buf.set_string(
        0,
        new_chat_y + 1,
        "─".repeat(usize::from(area.width)),
        Style::default().fg(RQ_RED_DIM),
    );

    let focused = ui.focus == Focus::Sidebar;
    let list_rows = area.height.saturating_sub(LIST_TOP + 1);
    let range = visible_entries(sessions.len(), ui.sidebar_selected, list_rows);

    for (row, index) in range.enumerate() {
        let session = &sessions[index];
        let y = LIST_TOP + u16::try_from(row).unwrap_or(u16::MAX) * ENTRY_ROWS;
        if y + 1 >= area.height {
            break;
        }

        let is_current = current == Some(&session.id);
        let marker = if is_current { "● " } else { "  " };
        let color = if is_current { RQ_RED } else { ASSISTANT_TEXT };
        let mut name_style = Style::default().fg(color);
        if focused && index == ui.sidebar_selected {
            name_style = name_style.add_modifier(Modifier::REVERSED);
        }
        let name: String = session.name.chars().take(width.saturating_sub(2)).collect();

        buf.set_string(1, y, marker, Style::default().fg(RQ_RED));
        buf.set_string(3, y, name, name_style);
        buf.set_string(
            3,
            y + 1,
            display::session_date(session.created()),
            Style::default().fg(DIM_GRAY),
        );
    }

    let hint = if focused {
        "↑↓ Enter m r x"
    } else {
        "Tab: sessions"
    };
    buf.set_string(1, area.height - 1, hint, Style::default().fg(DIM_GRAY));
}

// ============================================================================
// Conversation
// ============================================================================

/// Draw the current conversation; returns the wrapped line count
///
/// `ui.scroll_offset` is clamped to the content.
pub fn render_conversation<B: ChatBackend + 'static>(
    buf: &mut Buffer,
    controller: &ChatController<B>,
    ui: &mut UiState,
    now: Instant,
    started: Instant,
) -> usize {
    buf.reset();
    let area = buf.area;
    buf.set_style(area, Style::default().bg(RQ_BLACK));
    if area.width < 10 || area.height < 3 {
        return 0;
    }

    let Some(session) = controller.current_session() else {
        let text = "No chat selected - press Ctrl+N";
        let x = area.width.saturating_sub(u16::try_from(text.width()).unwrap_or(0)) / 2;
        buf.set_string(x, area.height / 2, text, Style::default().fg(DIM_GRAY));
        return 0;
    };

    if controller.is_transitioning(now) {
        return 0;
    }

    let width = usize::from(area.width - 2);
    let height = usize::from(area.height);
    let elapsed = now.saturating_duration_since(started);
    let pulse_on = (elapsed.as_millis() / PULSE.as_millis()) % 2 == 0;
    let edit = controller.edit_draft();

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in &session.messages {
        let editing = edit.is_some_and(|e| e.message_id == message.id);
        let content = match edit {
            Some(e) if editing => format!("{}{REVEAL_CURSOR}", e.draft),
            _ => controller.display_content(message),
        };
        let view = MessageView {
            message,
            content,
            selected: editing || ui.selected_message.as_ref() == Some(&message.id),
            pulse_on,
        };
        lines.extend(display::message_lines(&view, width));
    }

    let total = lines.len();
    let max_scroll = total.saturating_sub(height);
    ui.scroll_offset = ui.scroll_offset.min(max_scroll);

    let end = total - ui.scroll_offset;
    let start = end.saturating_sub(height);

    for (y, line) in (0..area.height).zip(&lines[start..end]) {
        buf.set_line(1, y, line, area.width - 2);
    }

    // fade the edges when there is more to scroll to
    let fade = Style::default().fg(DIM_GRAY);
    if start > 0 {
        buf.set_style(Rect::new(0, 0, area.width, 1), fade);
    }
    if ui.scroll_offset > 0 {
        buf.set_style(Rect::new(0, area.height - 1, area.width, 1), fade);
    }

    total
}

// ============================================================================
// Input bar
// ============================================================================

/// Draw the compose box
pub fn render_input<B: ChatBackend + 'static>(
    buf: &mut Buffer,
    controller: &ChatController<B>,
    ui: &UiState,
) {
    buf.reset();
    let area = buf.area;
    buf.set_style(area, Style::default().bg(RQ_BLACK));
    if area.width < 5 || area.height < 2 {
        return;
    }

    buf.set_string(
        0,
        0,
        "─".repeat(usize::from(area.width)),
        Style::default().fg(RQ_RED_DIM),
    );

    let text_rows = usize::from(area.height - 1);
    let text_width = usize::from(area.width - 2);
    let dim = Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC);

    if controller.current_session().is_none() {
        buf.set_string(1, 1, "No chat selected", dim);
        return;
    }
    if controller.edit_draft().is_some() {
        buf.set_string(1, 1, "Editing message: Enter to resend, Esc to cancel", dim);
        return;
    }
    if !controller.can_send() {
        let waiting = if controller.is_speaking() {
            "waiting... (Ctrl+S stops audio)"
        } else {
            "waiting..."
        };
        buf.set_string(1, 1, waiting, dim);
        return;
    }

    let cursor = if ui.focus == Focus::Chat { "▌" } else { "" };
    let full = format!("> {}{cursor}", controller.input());
    let wrapped: Vec<String> = textwrap::wrap(&full, text_width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();
    let skip = wrapped.len().saturating_sub(text_rows);

    for (y, line) in (1..area.height).zip(wrapped.iter().skip(skip)) {
        buf.set_string(1, y, line, Style::default().fg(USER_TEXT));
    }
    if skip > 0 {
        buf.set_string(area.width - 3, 0, "^", Style::default().fg(WARNING_YELLOW));
    }
}

// ============================================================================
// Status line
// ============================================================================

/// Draw the bottom status line
pub fn render_status<B: ChatBackend + 'static>(
    buf: &mut Buffer,
    controller: &ChatController<B>,
    ui: &UiState,
) {
    buf.reset();
    let area = buf.area;

    if let Some(warning) = controller.storage_warning() {
        let text = format!(" ! Could not save chats: {warning}");
        buf.set_string(0, 0, text, Style::default().fg(WARNING_YELLOW));
        return;
    }

    let state = if controller.is_speaking() {
        "speaking"
    } else if controller.pending().is_some() {
        "thinking"
    } else {
        "ready"
    };
    let keys = match ui.focus {
        Focus::Chat => {
            "Enter send | ^↑↓ select ^E edit ^D delete ^S stop | ^B sidebar | Tab | Esc quit"
        }
        Focus::Sidebar => "Enter open | m menu | r rename | x delete | Tab chat",
    };

    let line = Line::from(vec![
        Span::styled(" Red Queen ", Style::default().fg(RQ_RED).add_modifier(Modifier::BOLD)),
        Span::styled(format!("[{state}] "), Style::default().fg(ASSISTANT_TEXT)),
        Span::styled(keys, Style::default().fg(DIM_GRAY)),
    ]);
    buf.set_line(0, 0, &line, area.width);
}

// ============================================================================
// Dialogs
// ============================================================================

/// Build the modal for an open dialog
pub fn dialog_modal(dialog: &Dialog, sessions: &[Session]) -> Modal<'static> {
    let name_of = |id: &SessionId| {
        sessions
            .iter()
            .find(|s| &s.id == id)
            .map_or_else(String::new, |s| s.name.clone())
    };

    match dialog {
        Dialog::SessionMenu {
            session_id,
            selected,
        } => {
            let mut lines = vec![
                Line::styled(name_of(session_id), Style::default().fg(DIM_GRAY)),
                Line::default(),
            ];
            lines.extend(MenuItem::ALL.iter().enumerate().map(|(i, item)| {
                if i == *selected {
                    Line::styled(
                        format!("▸ {}", item.label()),
                        Style::default().fg(RQ_RED).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Line::styled(
                        format!("  {}", item.label()),
                        Style::default().fg(ASSISTANT_TEXT),
                    )
                }
            }));
            Modal::new("Chat Options")
                .lines(lines)
                .hint("↑↓ select  Enter choose  Esc close")
        }
        Dialog::ConfirmDelete { session_id } => Modal::new("Delete Chat Session")
            .lines(vec![
                Line::styled(
                    format!("Delete \"{}\"?", name_of(session_id)),
                    Style::default().fg(ASSISTANT_TEXT),
                ),
                Line::styled("This action cannot be undone.", Style::default().fg(RQ_RED)),
            ])
            .hint("y/Enter delete   n/Esc cancel"),
        Dialog::Rename { draft, .. } => Modal::new("Rename Chat")
            .lines(vec![Line::styled(
                format!("> {draft}▌{:<24}", ""),
                Style::default().fg(USER_TEXT),
            )])
            .hint("Enter save   Esc cancel"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_open_sidebar() {
        let l = layout(Rect::new(0, 0, 100, 30), true);
        assert_eq!(l.sidebar, Rect::new(0, 0, 30, 29));
        assert_eq!(l.conversation, Rect::new(30, 0, 70, 24));
        assert_eq!(l.input, Rect::new(30, 24, 70, 5));
        assert_eq!(l.status, Rect::new(0, 29, 100, 1));
    }

    #[test]
    fn test_layout_collapsed_sidebar() {
        let l = layout(Rect::new(0, 0, 100, 30), false);
        assert_eq!(l.sidebar.width, COLLAPSED_WIDTH);
        assert_eq!(l.conversation.x, COLLAPSED_WIDTH);
        assert_eq!(l.avatar.height, 4);
    }

    #[test]
    fn test_layout_tiny_terminal() {
        let l = layout(Rect::new(0, 0, 5, 2), true);
        assert_eq!(l.sidebar.width, 5);
        assert_eq!(l.conversation.width, 0);
        assert_eq!(l.input.height, 1);
    }

    #[test]
    fn test_visible_entries_follow_selection() {
        assert_eq!(visible_entries(10, 0, 6), 0..3);
        assert_eq!(visible_entries(10, 5, 6), 3..6);
        assert_eq!(visible_entries(2, 1, 6), 0..2);
        assert_eq!(visible_entries(0, 0, 6), 0..0);
    }

    #[test]
    fn test_delete_dialog_text() {
        let session = Session::new(SessionId::from_millis(1), "Chat 1");
        let modal = dialog_modal(
            &Dialog::ConfirmDelete {
                session_id: session.id.clone(),
            },
            std::slice::from_ref(&session),
        );
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 6));
        ratatui::widgets::Widget::render(modal, buf.area, &mut buf);
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Delete Chat Session"));
        assert!(text.contains("This action cannot be undone."));
        assert!(text.contains("\"Chat 1\""));
    }
}
