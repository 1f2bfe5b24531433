//! Main Application
//!
//! The App is a thin surface over the [`ChatController`]:
//! - Event loop (keyboard, mouse, resize)
//! - Converts key presses into controller calls
//! - Polls the controller for responses and animation frames
//! - Renders controller state through the layered compositor
//!
//! Everything that is not chat state (screen, focus, selections, dialogs)
//! lives in one [`UiState`] owned here.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use rand::seq::SliceRandom;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::Terminal;

use redqueen_core::{ChatBackend, ChatController, SubmitOutcome};

use crate::avatar::{Avatar, AvatarSize};
use crate::compositor::{Compositor, LayerId};
use crate::screens::{chat, disclaimer, landing};
use crate::ui_state::{Dialog, Focus, MenuItem, Screen, UiState};
use crate::widgets::{centered_rect, TextBlockState};

/// Quick goodbye lines (printed after the terminal is restored)
pub const QUICK_GOODBYES: &[&str] = &[
    "You're all going to die down here.",
    "Session terminated.",
    "The Hive will remember you.",
    "Containment protocols resuming.",
    "Goodbye. Try not to get infected.",
    "I'm sealing the doors behind you.",
    "Access revoked. Come back soon.",
];

/// Lines scrolled per mouse wheel notch
const WHEEL_LINES: usize = 3;

/// Main application state
pub struct App<B: ChatBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Goodbye message to show on exit
    goodbye_message: Option<String>,

    // === Chat ===
    controller: ChatController<B>,
    ui: UiState,

    // === UI Components ===
    compositor: Compositor,
    avatar: Avatar,
    layers: AppLayers,
    /// Scroll of the landing/disclaimer page
    page_state: TextBlockState,

    // === Misc State ===
    /// Wrapped conversation lines from the last render
    total_lines: usize,
    /// App start (drives the placeholder pulse)
    started: Instant,
    /// Last frame time (for the avatar)
    last_frame: Instant,
}

/// Layer IDs for UI regions
struct AppLayers {
    page: LayerId,
    sidebar: LayerId,
    avatar: LayerId,
    conversation: LayerId,
    input: LayerId,
    status: LayerId,
    dialog: LayerId,
}

impl<B: ChatBackend + 'static> App<B> {
    /// Create the app around a controller for a terminal of `size`
    ///
    /// An empty session collection gets one fresh session so the chat
    /// screen always opens on something.
    pub fn new(mut controller: ChatController<B>, size: (u16, u16)) -> Self {
        let now = Instant::now();
        if controller.sessions().is_empty() {
            tracing::info!("No saved chats; creating the first session");
            controller.create_session(now);
        }

        let area = Rect::new(0, 0, size.0, size.1);
        let mut compositor = Compositor::new(area);
        let layers = AppLayers {
            sidebar: compositor.create_layer(Rect::default(), 0),
            conversation: compositor.create_layer(Rect::default(), 0),
            input: compositor.create_layer(Rect::default(), 10),
            status: compositor.create_layer(Rect::default(), 10),
            avatar: compositor.create_layer(Rect::default(), 50),
            dialog: compositor.create_layer(Rect::default(), 100),
            page: compositor.create_layer(area, 200),
        };
        for id in [layers.page, layers.sidebar, layers.dialog] {
            compositor.set_opaque(id, true);
        }

        let mut ui = UiState::new();
        ui.sidebar_selected = current_index(&controller);

        let mut app = Self {
            running: true,
            goodbye_message: None,
            controller,
            ui,
            compositor,
            avatar: Avatar::new(),
            layers,
            page_state: TextBlockState::default(),
            total_lines: 0,
            started: now,
            last_frame: now,
        };
        app.apply_layout();
        app
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~30 FPS keeps the character reveal smooth
        let frame_duration = Duration::from_millis(33);
        let mut event_stream = EventStream::new();

        self.draw(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event, Instant::now()),
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                _ = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            self.update(Instant::now());
            self.draw(terminal)?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The chat controller
    pub fn controller(&self) -> &ChatController<B> {
        &self.controller
    }

    /// Mutable chat controller
    pub fn controller_mut(&mut self) -> &mut ChatController<B> {
        &mut self.controller
    }

    /// Shared UI state
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Goodbye message for display after the TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.goodbye_message.as_deref()
    }

    /// The avatar
    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match self.ui.screen {
            Screen::Landing => self.handle_landing_key(key),
            Screen::Disclaimer => self.handle_disclaimer_key(key),
            Screen::Chat if self.ui.has_dialog() => self.handle_dialog_key(key),
            Screen::Chat if self.controller.edit_draft().is_some() => self.handle_edit_key(key),
            Screen::Chat => match self.ui.focus {
                Focus::Sidebar => self.handle_sidebar_key(key, now),
                Focus::Chat => self.handle_chat_key(key, now),
            },
        }
    }

    fn handle_landing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.open_screen(Screen::Chat),
            KeyCode::Char('d') => self.open_screen(Screen::Disclaimer),
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Up => self.page_state.scroll(-1),
            KeyCode::Down => self.page_state.scroll(1),
            _ => {}
        }
    }

    fn handle_disclaimer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.ui.back();
                self.page_state = TextBlockState::default();
                self.apply_layout();
            }
            KeyCode::Up => self.page_state.scroll(-1),
            KeyCode::Down => self.page_state.scroll(1),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                if self.ui.selected_message.is_some() {
                    self.ui.selected_message = None;
                } else {
                    self.quit();
                }
            }

            // Sessions and layout
            KeyCode::Char('b') if ctrl => self.toggle_sidebar(),
            KeyCode::Char('n') if ctrl => self.new_session(now),
            KeyCode::Tab => self.ui.toggle_focus(self.controller.sidebar_open()),

            // Message actions
            KeyCode::Char('s') if ctrl => self.controller.stop_audio(),
            KeyCode::Up if ctrl => self.select_message(-1),
            KeyCode::Down if ctrl => self.select_message(1),
            KeyCode::Char('e') if ctrl => {
                if let Some(id) = self.ui.selected_message.clone() {
                    if !self.controller.begin_edit(&id) {
                        tracing::debug!(message_id = %id, "Only user messages can be edited");
                    }
                }
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(id) = self.ui.selected_message.take() {
                    self.controller.delete_message(&id);
                }
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = usize::from(self.conversation_height() / 2).max(1);
                self.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = usize::from(self.conversation_height() / 2).max(1);
                self.ui.scroll_offset = self.ui.scroll_offset.saturating_sub(page);
            }
            KeyCode::Home if ctrl => self.ui.scroll_offset = self.total_lines,
            KeyCode::End if ctrl => self.ui.scroll_offset = 0,

            // Compose
            KeyCode::Enter => match self.controller.submit() {
                SubmitOutcome::Sent(token) => {
                    tracing::debug!(seq = token.seq, "Message sent");
                    self.ui.reset_conversation_view();
                }
                SubmitOutcome::Ignored(reason) => {
                    tracing::debug!(?reason, "Submit ignored");
                }
            },
            KeyCode::Char(c) if !ctrl => self.controller.push_char(c),
            KeyCode::Backspace => self.controller.pop_char(),

            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.controller.cancel_edit(),
            KeyCode::Enter => match self.controller.save_edit() {
                SubmitOutcome::Sent(_) => self.ui.reset_conversation_view(),
                SubmitOutcome::Ignored(reason) => {
                    tracing::debug!(?reason, "Edit not saved");
                }
            },
            KeyCode::Backspace => {
                if let Some(draft) = self.controller.edit_draft_mut() {
                    draft.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(draft) = self.controller.edit_draft_mut() {
                    draft.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let count = self.controller.sessions().len();

        match key.code {
            KeyCode::Tab | KeyCode::Esc => self.ui.focus = Focus::Chat,
            KeyCode::Char('b') if ctrl => self.toggle_sidebar(),
            KeyCode::Char('n') if ctrl => self.new_session(now),
            KeyCode::Up => self.ui.move_sidebar_selection(-1, count),
            KeyCode::Down => self.ui.move_sidebar_selection(1, count),
            KeyCode::Enter => {
                if let Some(id) = self.selected_session_id() {
                    if self.controller.switch_session(&id, now) {
                        self.ui.reset_conversation_view();
                    }
                }
            }
            KeyCode::Char('m') => {
                if let Some(session_id) = self.selected_session_id() {
                    self.ui.dialog = Some(Dialog::SessionMenu {
                        session_id,
                        selected: 0,
                    });
                }
            }
            KeyCode::Char('r') => self.open_rename(),
            KeyCode::Char('x') | KeyCode::Delete => self.open_delete(),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.ui.dialog.take() else {
            return;
        };

        self.ui.dialog = match dialog {
            Dialog::SessionMenu {
                session_id,
                selected,
            } => match key.code {
                KeyCode::Esc => None,
                KeyCode::Up => Some(Dialog::SessionMenu {
                    session_id,
                    selected: selected.saturating_sub(1),
                }),
                KeyCode::Down => Some(Dialog::SessionMenu {
                    session_id,
                    selected: (selected + 1).min(MenuItem::ALL.len() - 1),
                }),
                KeyCode::Enter => match MenuItem::ALL.get(selected) {
                    Some(MenuItem::Rename) => rename_dialog(&self.controller, session_id),
                    Some(MenuItem::Delete) => Some(Dialog::ConfirmDelete { session_id }),
                    Some(MenuItem::Close) | None => None,
                },
                _ => Some(Dialog::SessionMenu {
                    session_id,
                    selected,
                }),
            },

            Dialog::ConfirmDelete { session_id } => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                    if self.controller.delete_session(&session_id) {
                        tracing::info!(session_id = %session_id, "Session deleted");
                        self.ui.reset_conversation_view();
                    }
                    let count = self.controller.sessions().len();
                    self.ui.move_sidebar_selection(0, count);
                    None
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => None,
                _ => Some(Dialog::ConfirmDelete { session_id }),
            },

            Dialog::Rename {
                session_id,
                mut draft,
            } => match key.code {
                KeyCode::Esc => None,
                KeyCode::Enter if draft.trim().is_empty() => {
                    Some(Dialog::Rename { session_id, draft })
                }
                KeyCode::Enter => {
                    self.controller.rename_session(&session_id, &draft);
                    None
                }
                KeyCode::Backspace => {
                    draft.pop();
                    Some(Dialog::Rename { session_id, draft })
                }
                KeyCode::Char(c) => {
                    draft.push(c);
                    Some(Dialog::Rename { session_id, draft })
                }
                _ => Some(Dialog::Rename { session_id, draft }),
            },
        };
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.ui.screen != Screen::Chat
            || self.compositor.layer_at(mouse.column, mouse.row) != Some(self.layers.conversation)
        {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_LINES),
            MouseEventKind::ScrollDown => {
                self.ui.scroll_offset = self.ui.scroll_offset.saturating_sub(WHEEL_LINES);
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.compositor.resize(Rect::new(0, 0, width, height));
        self.apply_layout();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn quit(&mut self) {
        self.controller.stop_audio();
        self.goodbye_message = QUICK_GOODBYES
            .choose(&mut rand::thread_rng())
            .map(ToString::to_string);
        self.running = false;
    }

    fn open_screen(&mut self, screen: Screen) {
        self.ui.navigate(screen);
        self.page_state = TextBlockState::default();
        self.apply_layout();
    }

    fn toggle_sidebar(&mut self) {
        let open = !self.controller.sidebar_open();
        self.controller.set_sidebar_open(open);
        if !open {
            self.ui.focus = Focus::Chat;
        }
        self.apply_layout();
    }

    fn new_session(&mut self, now: Instant) {
        if let Some(id) = self.controller.create_session(now) {
            tracing::info!(session_id = %id, "New chat");
        }
        self.ui.reset_conversation_view();
        self.ui.sidebar_selected = current_index(&self.controller);
    }

    fn selected_session_id(&self) -> Option<redqueen_core::SessionId> {
        self.controller
            .sessions()
            .get(self.ui.sidebar_selected)
            .map(|s| s.id.clone())
    }

    fn open_rename(&mut self) {
        if let Some(id) = self.selected_session_id() {
            self.ui.dialog = rename_dialog(&self.controller, id);
        }
    }

    fn open_delete(&mut self) {
        if let Some(session_id) = self.selected_session_id() {
            self.ui.dialog = Some(Dialog::ConfirmDelete { session_id });
        }
    }

    /// Move the message selection up (-1) or down (+1) in the current session
    fn select_message(&mut self, delta: isize) {
        let Some(session) = self.controller.current_session() else {
            return;
        };
        let count = session.messages.len();
        if count == 0 {
            return;
        }

        let index = match self
            .ui
            .selected_message
            .as_ref()
            .and_then(|id| session.position_of(id))
        {
            Some(i) => i.saturating_add_signed(delta).min(count - 1),
            None => count - 1,
        };
        self.ui.selected_message = Some(session.messages[index].id.clone());
    }

    fn scroll_up(&mut self, lines: usize) {
        let max = self.total_lines.saturating_sub(1);
        self.ui.scroll_offset = (self.ui.scroll_offset + lines).min(max);
    }

    fn conversation_height(&self) -> u16 {
        chat::layout(self.compositor.area(), self.controller.sidebar_open())
            .conversation
            .height
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Pull responses, advance animations and the avatar
    pub fn update(&mut self, now: Instant) {
        for applied in self.controller.poll_responses(now) {
            tracing::debug!(
                seq = applied.token.seq,
                outcome = ?applied.outcome,
                animation = ?applied.animation,
                "Response applied"
            );
        }
        self.controller.tick(now);

        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.avatar.set_talking(self.controller.is_talking());
        self.avatar.update(delta);
    }

    /// Place and show layers for the current screen and sidebar state
    fn apply_layout(&mut self) {
        let area = self.compositor.area();
        let on_chat = self.ui.screen == Screen::Chat;
        let open = self.controller.sidebar_open();
        let layout = chat::layout(area, open);

        self.compositor.place_layer(self.layers.page, area);
        self.compositor.place_layer(self.layers.sidebar, layout.sidebar);
        self.compositor.place_layer(self.layers.avatar, layout.avatar);
        self.compositor
            .place_layer(self.layers.conversation, layout.conversation);
        self.compositor.place_layer(self.layers.input, layout.input);
        self.compositor.place_layer(self.layers.status, layout.status);

        self.avatar
            .set_size(if open { AvatarSize::Full } else { AvatarSize::Compact });

        self.compositor.set_visible(self.layers.page, !on_chat);
        for id in [
            self.layers.sidebar,
            self.layers.avatar,
            self.layers.conversation,
            self.layers.input,
            self.layers.status,
        ] {
            self.compositor.set_visible(id, on_chat);
        }
    }

    /// Draw every visible layer and composite them
    pub fn render_frame(&mut self, now: Instant) -> &Buffer {
        match self.ui.screen {
            Screen::Landing => self.render_page(landing::render),
            Screen::Disclaimer => self.render_page(disclaimer::render),
            Screen::Chat => self.render_chat(now),
        }
        self.compositor.composite()
    }

    fn render_page(&mut self, draw: fn(&mut Buffer, &mut TextBlockState)) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.page) {
            draw(buf, &mut self.page_state);
        }
        self.compositor.set_visible(self.layers.dialog, false);
    }

    fn render_chat(&mut self, now: Instant) {
        let open = self.controller.sidebar_open();

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.sidebar) {
            chat::render_sidebar(
                buf,
                self.controller.sessions(),
                self.controller.current_session_id(),
                &self.ui,
                open,
            );
        }
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.avatar) {
            buf.reset();
            self.avatar.render(buf);
        }
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.conversation) {
            self.total_lines =
                chat::render_conversation(buf, &self.controller, &mut self.ui, now, self.started);
        }
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.input) {
            chat::render_input(buf, &self.controller, &self.ui);
        }
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) {
            chat::render_status(buf, &self.controller, &self.ui);
        }

        self.render_dialog();
    }

    fn render_dialog(&mut self) {
        let Some(dialog) = self.ui.dialog.as_ref() else {
            self.compositor.set_visible(self.layers.dialog, false);
            return;
        };

        let modal = chat::dialog_modal(dialog, self.controller.sessions());
        let area = self.compositor.area();
        let (w, h) = modal.size(area);
        self.compositor
            .place_layer(self.layers.dialog, centered_rect(area, w, h));
        self.compositor.set_visible(self.layers.dialog, true);

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.dialog) {
            buf.reset();
            let local = buf.area;
            modal.render(local, buf);
        }
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let output = self.render_frame(Instant::now());
            let area = frame.area();
            let buf = frame.buffer_mut();
            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    if let Some(cell) = output.cell((x, y)) {
                        buf[(x, y)] = cell.clone();
                    }
                }
            }
        })?;
        Ok(())
    }
}

/// Sidebar row of the current session
fn current_index<B: ChatBackend + 'static>(controller: &ChatController<B>) -> usize {
    controller
        .current_session_id()
        .and_then(|id| controller.sessions().iter().position(|s| &s.id == id))
        .unwrap_or(0)
}

fn rename_dialog<B: ChatBackend + 'static>(
    controller: &ChatController<B>,
    session_id: redqueen_core::SessionId,
) -> Option<Dialog> {
    let draft = controller
        .sessions()
        .iter()
        .find(|s| s.id == session_id)?
        .name
        .clone();
    Some(Dialog::Rename { session_id, draft })
}
