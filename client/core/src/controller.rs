//! Send/Edit Controller
//!
//! The chat view's state owner. It turns user actions into session
//! mutations, issues chat requests, and applies their responses.
//!
//! # Request lifecycle
//!
//! ```text
//! Idle ──submit──▶ Sending ──response──▶ Idle
//!                  (placeholder,          (placeholder replaced by the
//!                   talking)               reply or the error message)
//! ```
//!
//! Requests run on a spawned task and report back over a channel, tagged
//! with a [`RequestToken`]. The surface drains that channel with
//! [`ChatController::poll_responses`] from its frame loop (or awaits it with
//! [`ChatController::recv_response`]); all session mutation happens there,
//! on the owner's side. A response is applied to the session and
//! placeholder named by its token, never to "whatever is current".
//!
//! Persistence failures never interrupt a flow: the store keeps its
//! in-memory state, the failure is logged, and the last one is exposed
//! through [`ChatController::storage_warning`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::animation::MessageAnimator;
use crate::audio::AudioPlayer;
use crate::backend::{BackendError, ChatBackend, ChatReply, ChatRequest};
use crate::config::ClientConfig;
use crate::messages::{MessageId, RequestToken, SessionId};
use crate::reducer;
use crate::session::{ChatMessage, Session, ERROR_REPLY};
use crate::storage::StorageError;
use crate::store::SessionStore;

/// Timing and feature settings for the controller
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Delay between revealed characters
    pub reveal_interval: Duration,
    /// Minimum gap between playback position samples
    pub highlight_poll: Duration,
    /// How long content stays hidden after a session switch
    pub transition: Duration,
    /// Give up on a request after this long
    pub request_timeout: Duration,
    /// Whether spoken replies are played
    pub audio_enabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(10),
            highlight_poll: Duration::from_millis(5),
            transition: Duration::from_millis(600),
            request_timeout: Duration::from_secs(60),
            audio_enabled: true,
        }
    }
}

impl ControllerConfig {
    /// Take the controller settings from the client configuration
    #[must_use]
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self {
            reveal_interval: config.reveal_interval,
            highlight_poll: config.highlight_poll,
            transition: config.transition,
            request_timeout: config.request_timeout,
            audio_enabled: config.audio_enabled,
        }
    }
}

/// Why a submission did nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input (or edit draft) is blank
    EmptyInput,
    /// No session is current, or the edited session is gone
    NoSession,
    /// A request is already outstanding
    RequestInFlight,
    /// A spoken reply is still playing
    Speaking,
    /// `save_edit` without an open edit
    NotEditing,
}

/// Result of a send or edit-resend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Request issued
    Sent(RequestToken),
    /// Validation rejected the action; nothing changed
    Ignored(IgnoreReason),
}

/// How a response was written into its session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Plain text reply stored
    Text,
    /// Quota notice stored verbatim
    QuotaExceeded,
    /// Spoken reply stored
    Spoken,
    /// Request failed; the fixed error message was stored
    Failed,
    /// The session or placeholder no longer exists; nothing was written
    Dropped,
}

/// Presentation started for an applied response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    /// Character reveal
    Reveal,
    /// Word highlight with audio playback
    Highlight,
}

/// A response after it has been applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedResponse {
    /// The request this answers
    pub token: RequestToken,
    /// What was written
    pub outcome: ResponseOutcome,
    /// Animation started, if the target session is current
    pub animation: Option<AnimationKind>,
}

/// An open edit of a user message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDraft {
    /// Session holding the message
    pub session_id: SessionId,
    /// Message being edited
    pub message_id: MessageId,
    /// Replacement text
    pub draft: String,
}

/// Response travelling back from a request task
#[derive(Debug)]
struct ResponseEnvelope {
    token: RequestToken,
    result: Result<ChatReply, BackendError>,
}

/// The chat state machine
pub struct ChatController<B: ChatBackend> {
    /// Chat backend
    backend: Arc<B>,
    /// Session collection
    store: SessionStore,
    /// Audio output for spoken replies
    player: Box<dyn AudioPlayer>,
    /// Reveal/highlight slot
    animator: MessageAnimator,
    /// Settings
    config: ControllerConfig,
    /// Compose box contents
    input: String,
    /// Open edit, if any
    edit: Option<EditDraft>,
    /// Outstanding request
    pending: Option<RequestToken>,
    /// Next request sequence number
    next_seq: u64,
    /// Sender cloned into request tasks
    response_tx: mpsc::Sender<ResponseEnvelope>,
    /// Responses waiting to be applied
    response_rx: mpsc::Receiver<ResponseEnvelope>,
    /// Whether a spoken reply is playing
    speaking: bool,
    /// Content hidden until this instant
    transition_until: Option<Instant>,
    /// Last persistence failure
    storage_warning: Option<String>,
}

impl<B: ChatBackend + 'static> ChatController<B> {
    /// Create a controller over a loaded store
    pub fn new(
        backend: B,
        store: SessionStore,
        player: Box<dyn AudioPlayer>,
        config: ControllerConfig,
    ) -> Self {
        let (response_tx, response_rx) = mpsc::channel(16);
        Self {
            backend: Arc::new(backend),
            store,
            player,
            animator: MessageAnimator::new(),
            config,
            input: String::new(),
            edit: None,
            pending: None,
            next_seq: 1,
            response_tx,
            response_rx,
            speaking: false,
            transition_until: None,
            storage_warning: None,
        }
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    /// The session store
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// All sessions in creation order
    pub fn sessions(&self) -> &[Session] {
        self.store.sessions()
    }

    /// The current session
    pub fn current_session(&self) -> Option<&Session> {
        self.store.current()
    }

    /// ID of the current session
    pub fn current_session_id(&self) -> Option<&SessionId> {
        self.store.current_id()
    }

    /// The animator (for surfaces that want to inspect it)
    pub fn animator(&self) -> &MessageAnimator {
        &self.animator
    }

    /// The outstanding request, if any
    pub fn pending(&self) -> Option<&RequestToken> {
        self.pending.as_ref()
    }

    /// A request is outstanding or a spoken reply is playing
    pub fn is_talking(&self) -> bool {
        self.pending.is_some() || self.speaking
    }

    /// A spoken reply is playing
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Whether the send control should be enabled
    pub fn can_send(&self) -> bool {
        !self.is_talking() && self.store.current().is_some()
    }

    /// Whether content should be hidden after a session switch
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.transition_until.is_some_and(|until| now < until)
    }

    /// Last persistence failure, if any
    pub fn storage_warning(&self) -> Option<&str> {
        self.storage_warning.as_deref()
    }

    /// What the view should show for a message right now
    ///
    /// Loading placeholders render as empty text; an animated message shows
    /// its reveal frame or highlight markup; anything else shows its stored
    /// content.
    pub fn display_content(&self, message: &ChatMessage) -> String {
        if message.is_loading {
            return String::new();
        }
        self.animator
            .display_for(&message.id)
            .unwrap_or_else(|| message.content.clone())
    }

    // =========================================================================
    // Input buffer
    // =========================================================================

    /// Compose box contents
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the compose box contents
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Type a character
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Delete the last character
    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Create a session and make it current
    pub fn create_session(&mut self, now: Instant) -> Option<SessionId> {
        let result = self.store.create_session();
        self.persisted(result);
        self.leave_current_view(now);
        self.store.current_id().cloned()
    }

    /// Switch to another session; unknown IDs are ignored
    pub fn switch_session(&mut self, id: &SessionId, now: Instant) -> bool {
        if self.store.current_id() == Some(id) {
            return true;
        }
        if self.store.session(id).is_none() {
            return false;
        }

        let result = self.store.switch_session(id);
        self.persisted(result);
        self.leave_current_view(now);
        tracing::debug!(session_id = %id, "Switched session");
        true
    }

    /// Rename a session; blank names are ignored
    pub fn rename_session(&mut self, id: &SessionId, name: &str) -> bool {
        let result = self.store.rename_session(id, name);
        self.persisted(result).unwrap_or(true)
    }

    /// Delete a session
    ///
    /// A request still in flight for it stops blocking new sends; its
    /// response is dropped when it arrives.
    pub fn delete_session(&mut self, id: &SessionId) -> bool {
        if self.store.session(id).is_none() {
            return false;
        }
        let was_current = self.store.current_id() == Some(id);

        if self.edit.as_ref().is_some_and(|e| &e.session_id == id) {
            self.edit = None;
        }
        if was_current {
            self.stop_presentation();
        }

        let result = self.store.delete_session(id);
        self.persisted(result);
        self.release_orphaned_request();
        true
    }

    /// Persisted sidebar visibility
    pub fn sidebar_open(&self) -> bool {
        self.store.sidebar_open()
    }

    /// Persist sidebar visibility
    pub fn set_sidebar_open(&mut self, open: bool) {
        let result = self.store.set_sidebar_open(open);
        self.persisted(result);
    }

    // =========================================================================
    // Send / edit / delete
    // =========================================================================

    /// Send the compose box contents to the current session
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.input.trim().is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        let Some(session_id) = self.store.current_id().cloned() else {
            return SubmitOutcome::Ignored(IgnoreReason::NoSession);
        };
        if let Some(reason) = self.busy_reason() {
            return SubmitOutcome::Ignored(reason);
        }

        let question = std::mem::take(&mut self.input);
        self.animator.cancel();

        let result = self.store.update_messages(&session_id, |messages| {
            reducer::append_user_and_placeholder(messages, &question)
        });
        self.persisted(result);

        let Some(placeholder_id) = self.last_message_id(&session_id) else {
            return SubmitOutcome::Ignored(IgnoreReason::NoSession);
        };
        SubmitOutcome::Sent(self.issue_request(session_id, placeholder_id, question))
    }

    /// Open an edit of a user message in the current session
    pub fn begin_edit(&mut self, message_id: &MessageId) -> bool {
        let Some(session) = self.store.current() else {
            return false;
        };
        let Some(message) = session.get_message(message_id).filter(|m| m.is_user()) else {
            return false;
        };

        self.edit = Some(EditDraft {
            session_id: session.id.clone(),
            message_id: message_id.clone(),
            draft: message.content.clone(),
        });
        true
    }

    /// The open edit
    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit.as_ref()
    }

    /// Mutable access to the edit text
    pub fn edit_draft_mut(&mut self) -> Option<&mut String> {
        self.edit.as_mut().map(|e| &mut e.draft)
    }

    /// Discard the open edit
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Save the open edit and resend from that point
    ///
    /// Everything after the edited message is discarded, then a new loading
    /// placeholder is appended and the edited text is sent.
    pub fn save_edit(&mut self) -> SubmitOutcome {
        let Some(edit) = self.edit.as_ref() else {
            return SubmitOutcome::Ignored(IgnoreReason::NotEditing);
        };
        if edit.draft.trim().is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        let Some(index) = self
            .store
            .session(&edit.session_id)
            .and_then(|s| s.position_of(&edit.message_id))
        else {
            self.edit = None;
            return SubmitOutcome::Ignored(IgnoreReason::NoSession);
        };
        if let Some(reason) = self.busy_reason() {
            return SubmitOutcome::Ignored(reason);
        }

        let Some(EditDraft {
            session_id, draft, ..
        }) = self.edit.take()
        else {
            return SubmitOutcome::Ignored(IgnoreReason::NotEditing);
        };
        self.animator.cancel();

        let result = self.store.update_messages(&session_id, |messages| {
            let edited = reducer::edit_in_place(messages, index, &draft);
            reducer::append_placeholder(&reducer::truncate_after(&edited, index))
        });
        self.persisted(result);

        let Some(placeholder_id) = self.last_message_id(&session_id) else {
            return SubmitOutcome::Ignored(IgnoreReason::NoSession);
        };
        tracing::debug!(session_id = %session_id, index, "Resending edited message");
        SubmitOutcome::Sent(self.issue_request(session_id, placeholder_id, draft))
    }

    /// Delete a message from the current session (with its reply, if paired)
    pub fn delete_message(&mut self, message_id: &MessageId) -> bool {
        let Some(session) = self.store.current() else {
            return false;
        };
        let Some(index) = session.position_of(message_id) else {
            return false;
        };
        let session_id = session.id.clone();

        if self
            .animator
            .active_message()
            .is_some_and(|active| session.position_of(active).is_some_and(|i| i >= index))
        {
            self.stop_presentation();
        }
        if self.edit.as_ref().is_some_and(|e| &e.message_id == message_id) {
            self.edit = None;
        }

        let result = self
            .store
            .update_messages(&session_id, |messages| reducer::delete_at(messages, index));
        self.persisted(result);
        self.release_orphaned_request();
        true
    }

    /// Stop a playing spoken reply and clear its highlight; safe to repeat
    pub fn stop_audio(&mut self) {
        self.player.stop();
        self.animator.clear_highlight();
        if self.speaking {
            tracing::debug!("Audio stopped");
        }
        self.speaking = false;
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance animations and playback tracking
    ///
    /// Returns `true` if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.transition_until.is_some_and(|until| now >= until) {
            self.transition_until = None;
            changed = true;
        }

        changed |= self.animator.tick(now);

        if self.speaking {
            if self.player.is_playing(now) {
                let position = self.player.position(now);
                changed |= self.animator.sample_position(now, position);
            } else {
                tracing::debug!("Audio playback finished");
                self.animator.clear_highlight();
                self.speaking = false;
                changed = true;
            }
        }

        changed
    }

    /// Apply every response that has arrived, without waiting
    pub fn poll_responses(&mut self, now: Instant) -> Vec<AppliedResponse> {
        let mut applied = Vec::new();
        while let Ok(envelope) = self.response_rx.try_recv() {
            applied.push(self.apply_response(envelope, now));
        }
        applied
    }

    /// Wait for the outstanding response and apply it
    ///
    /// Returns `None` immediately when nothing is outstanding.
    pub async fn recv_response(&mut self) -> Option<AppliedResponse> {
        if self.pending.is_none() {
            let envelope = self.response_rx.try_recv().ok()?;
            return Some(self.apply_response(envelope, Instant::now()));
        }
        let envelope = self.response_rx.recv().await?;
        Some(self.apply_response(envelope, Instant::now()))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn busy_reason(&self) -> Option<IgnoreReason> {
        if self.pending.is_some() {
            Some(IgnoreReason::RequestInFlight)
        } else if self.speaking {
            Some(IgnoreReason::Speaking)
        } else {
            None
        }
    }

    fn last_message_id(&self, session_id: &SessionId) -> Option<MessageId> {
        self.store
            .session(session_id)
            .and_then(|s| s.messages.last())
            .map(|m| m.id.clone())
    }

    fn issue_request(
        &mut self,
        session_id: SessionId,
        placeholder_id: MessageId,
        question: String,
    ) -> RequestToken {
        let token = RequestToken {
            seq: self.next_seq,
            session_id,
            placeholder_id,
        };
        self.next_seq += 1;
        self.pending = Some(token.clone());

        tracing::info!(
            seq = token.seq,
            session_id = %token.session_id,
            backend = self.backend.name(),
            "Issuing chat request"
        );

        let backend = Arc::clone(&self.backend);
        let tx = self.response_tx.clone();
        let timeout = self.config.request_timeout;
        let task_token = token.clone();

        tokio::spawn(async move {
            let request = ChatRequest::new(question);
            let result = match tokio::time::timeout(timeout, backend.send(&request)).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(timeout)),
            };
            let envelope = ResponseEnvelope {
                token: task_token,
                result,
            };
            if tx.send(envelope).await.is_err() {
                tracing::debug!("Controller gone before the response arrived");
            }
        });

        token
    }

    fn apply_response(&mut self, envelope: ResponseEnvelope, now: Instant) -> AppliedResponse {
        let ResponseEnvelope { token, result } = envelope;

        if self.pending.as_ref().is_some_and(|p| p.seq == token.seq) {
            self.pending = None;
        }

        let placeholder_alive = self
            .store
            .session(&token.session_id)
            .is_some_and(|s| s.position_of(&token.placeholder_id).is_some());
        if !placeholder_alive {
            tracing::info!(
                seq = token.seq,
                session_id = %token.session_id,
                "Dropping response for a deleted session or message"
            );
            return AppliedResponse {
                token,
                outcome: ResponseOutcome::Dropped,
                animation: None,
            };
        }

        let (content, outcome) = match &result {
            Ok(ChatReply::Text {
                answer,
                quota_exceeded: true,
            }) => (answer.clone(), ResponseOutcome::QuotaExceeded),
            Ok(ChatReply::Text { answer, .. }) => (answer.clone(), ResponseOutcome::Text),
            Ok(ChatReply::Spoken { text, .. }) => (text.clone(), ResponseOutcome::Spoken),
            Err(e) => {
                tracing::warn!(seq = token.seq, error = %e, "Chat request failed");
                (ERROR_REPLY.to_string(), ResponseOutcome::Failed)
            }
        };

        let placeholder_id = token.placeholder_id.clone();
        let reply = ChatMessage::assistant(content.clone());
        let write = self.store.update_messages(&token.session_id, |messages| {
            reducer::replace_by_id(messages, &placeholder_id, reply)
        });
        self.persisted(write);

        let is_current = self.store.current_id() == Some(&token.session_id);
        let animation = if is_current {
            self.present(&token, &content, outcome, result.ok(), now)
        } else {
            tracing::debug!(seq = token.seq, "Response landed in a background session");
            None
        };

        tracing::info!(seq = token.seq, ?outcome, ?animation, "Applied chat response");
        AppliedResponse {
            token,
            outcome,
            animation,
        }
    }

    fn present(
        &mut self,
        token: &RequestToken,
        content: &str,
        outcome: ResponseOutcome,
        reply: Option<ChatReply>,
        now: Instant,
    ) -> Option<AnimationKind> {
        let message_id = token.placeholder_id.clone();
        match (outcome, reply) {
            (ResponseOutcome::Text, _) => {
                self.start_reveal(message_id, content, now);
                Some(AnimationKind::Reveal)
            }
            (ResponseOutcome::Spoken, Some(reply)) => {
                let hint = Duration::try_from_secs_f64(reply.duration_hint().unwrap_or(0.0))
                    .unwrap_or_default();
                let ChatReply::Spoken {
                    audio,
                    word_timings,
                    ..
                } = reply
                else {
                    return None;
                };

                if !self.config.audio_enabled {
                    self.start_reveal(message_id, content, now);
                    return Some(AnimationKind::Reveal);
                }

                match self.player.play(&audio, hint, now) {
                    Ok(()) => {
                        self.animator.start_highlight(
                            message_id,
                            content,
                            word_timings,
                            self.config.highlight_poll,
                        );
                        self.speaking = true;
                        Some(AnimationKind::Highlight)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Audio playback unavailable, revealing text");
                        self.start_reveal(message_id, content, now);
                        Some(AnimationKind::Reveal)
                    }
                }
            }
            _ => None,
        }
    }

    fn start_reveal(&mut self, message_id: MessageId, content: &str, now: Instant) {
        self.animator
            .start_reveal(message_id, content, self.config.reveal_interval, now);
    }

    /// Forget the outstanding request once its placeholder is gone
    fn release_orphaned_request(&mut self) {
        let orphaned = self.pending.as_ref().is_some_and(|token| {
            self.store
                .session(&token.session_id)
                .and_then(|s| s.position_of(&token.placeholder_id))
                .is_none()
        });
        if orphaned {
            if let Some(token) = self.pending.take() {
                tracing::debug!(seq = token.seq, "Request target deleted, sending unblocked");
            }
        }
    }

    /// Stop animations and audio that belong to the visible session
    fn stop_presentation(&mut self) {
        self.animator.cancel();
        self.player.stop();
        self.speaking = false;
    }

    fn leave_current_view(&mut self, now: Instant) {
        self.stop_presentation();
        self.edit = None;
        self.transition_until = Some(now + self.config.transition);
    }

    fn persisted<T>(&mut self, result: Result<T, StorageError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist chat sessions");
                self.storage_warning = Some(e.to_string());
                None
            }
        }
    }
}

impl<B: ChatBackend> std::fmt::Debug for ChatController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("store", &self.store)
            .field("pending", &self.pending)
            .field("speaking", &self.speaking)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ClockPlayer;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn send(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
            Ok(ChatReply::text(format!("echo: {}", request.question)))
        }
    }

    fn controller() -> ChatController<EchoBackend> {
        let store = SessionStore::load(Box::new(MemoryStore::new()));
        ChatController::new(
            EchoBackend,
            store,
            Box::new(ClockPlayer::new()),
            ControllerConfig::default(),
        )
    }

    #[test]
    fn test_submit_blank_is_ignored() {
        let mut c = controller();
        c.create_session(Instant::now());
        c.set_input("   ");
        assert_eq!(c.submit(), SubmitOutcome::Ignored(IgnoreReason::EmptyInput));
        assert_eq!(c.current_session().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_submit_without_session_is_ignored() {
        let mut c = controller();
        c.set_input("hello");
        assert_eq!(c.submit(), SubmitOutcome::Ignored(IgnoreReason::NoSession));
        assert_eq!(c.input(), "hello");
    }

    #[test]
    fn test_begin_edit_only_user_messages() {
        let mut c = controller();
        c.create_session(Instant::now());
        let greeting = c.current_session().unwrap().messages[0].id.clone();
        assert!(!c.begin_edit(&greeting));
        assert!(c.edit_draft().is_none());
        assert_eq!(c.save_edit(), SubmitOutcome::Ignored(IgnoreReason::NotEditing));
    }

    #[test]
    fn test_switch_sets_transition_flag() {
        let t0 = Instant::now();
        let mut c = controller();
        let first = c.create_session(t0).unwrap();
        c.create_session(t0);

        let later = t0 + Duration::from_secs(5);
        assert!(!c.is_transitioning(later));
        assert!(c.switch_session(&first, later));
        assert!(c.is_transitioning(later + Duration::from_millis(100)));
        assert!(!c.is_transitioning(later + Duration::from_millis(600)));

        assert!(c.tick(later + Duration::from_millis(700)));
        assert!(!c.switch_session(&SessionId::from("missing"), later));
        assert_eq!(c.current_session_id(), Some(&first));
    }

    #[test]
    fn test_stop_audio_when_idle_is_noop() {
        let mut c = controller();
        c.stop_audio();
        c.stop_audio();
        assert!(!c.is_talking());
    }

    #[test]
    fn test_display_content_for_placeholder_is_empty() {
        let c = controller();
        assert_eq!(c.display_content(&ChatMessage::placeholder()), "");
        assert_eq!(c.display_content(&ChatMessage::assistant("hi")), "hi");
    }

    #[tokio::test]
    async fn test_round_trip_reveals_reply() {
        let mut c = controller();
        c.create_session(Instant::now());
        c.set_input("ping");

        let SubmitOutcome::Sent(token) = c.submit() else {
            panic!("submit should send");
        };
        assert!(c.is_talking());
        assert!(c.input().is_empty());

        let applied = c.recv_response().await.unwrap();
        assert_eq!(applied.token, token);
        assert_eq!(applied.outcome, ResponseOutcome::Text);
        assert_eq!(applied.animation, Some(AnimationKind::Reveal));
        assert!(!c.is_talking());

        let last = c.current_session().unwrap().messages.last().unwrap().clone();
        assert_eq!(last.id, token.placeholder_id);
        assert_eq!(last.content, "echo: ping");
        assert!(c.display_content(&last).ends_with(crate::animation::REVEAL_CURSOR));
    }

    #[tokio::test]
    async fn test_recv_without_pending_returns_none() {
        let mut c = controller();
        assert!(c.recv_response().await.is_none());
    }
}
