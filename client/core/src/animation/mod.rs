//! Animation System - Reply Presentation
//!
//! Two mutually exclusive presentations for a freshly answered message:
//!
//! - **Reveal**: plain text replies appear one character at a time
//! - **Highlight**: spoken replies mark the word currently audible
//!
//! # Architecture
//!
//! ```text
//! ChatController
//!     │ start_reveal / start_highlight / cancel
//!     ▼
//! MessageAnimator (one slot)
//!     │ display_for(message_id)
//!     ▼
//! Surface renders the overlay instead of the stored content
//! ```
//!
//! The animator owns a single slot, so at most one animation is alive at a
//! time. Starting either mode replaces whatever was running. The overlay is
//! never written back to the session store.

mod highlight;
mod reveal;

pub use highlight::{
    highlight_occurrence, normalize_word, occurrence_index, timing_index_at, WordHighlight,
    MARK_CLOSE, MARK_OPEN,
};
pub use reveal::{TypingReveal, REVEAL_CURSOR};

use std::time::{Duration, Instant};

use crate::backend::WordTiming;
use crate::messages::MessageId;

/// The animation currently occupying the slot
#[derive(Clone, Debug)]
pub enum Animation {
    /// Character-by-character reveal
    Reveal(TypingReveal),
    /// Spoken-word highlight
    Highlight(WordHighlight),
}

impl Animation {
    /// Message this animation presents
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Reveal(r) => r.message_id(),
            Self::Highlight(h) => h.message_id(),
        }
    }
}

/// Single-slot animation driver
#[derive(Clone, Debug, Default)]
pub struct MessageAnimator {
    active: Option<Animation>,
}

impl MessageAnimator {
    /// Create an idle animator
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` for `message_id`, replacing any running animation
    pub fn start_reveal(
        &mut self,
        message_id: MessageId,
        text: &str,
        interval: Duration,
        now: Instant,
    ) {
        self.cancel();
        tracing::debug!(message_id = %message_id, chars = text.chars().count(), "Starting reveal");
        self.active = Some(Animation::Reveal(TypingReveal::new(
            message_id, text, interval, now,
        )));
    }

    /// Start highlighting `text` for `message_id`, replacing any running animation
    pub fn start_highlight(
        &mut self,
        message_id: MessageId,
        text: &str,
        timings: Vec<WordTiming>,
        poll_interval: Duration,
    ) {
        self.cancel();
        tracing::debug!(message_id = %message_id, words = timings.len(), "Starting highlight");
        self.active = Some(Animation::Highlight(WordHighlight::new(
            message_id,
            text,
            timings,
            poll_interval,
        )));
    }

    /// Stop whatever is running; returns the message it was presenting
    ///
    /// Calling this with nothing active is a no-op.
    pub fn cancel(&mut self) -> Option<MessageId> {
        self.active.take().map(|a| a.message_id().clone())
    }

    /// Advance a running reveal; finished reveals release the slot
    ///
    /// Returns `true` if the visible frame changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(Animation::Reveal(reveal)) = self.active.as_mut() else {
            return false;
        };
        let changed = reveal.tick(now);
        if reveal.is_complete() {
            self.active = None;
            return true;
        }
        changed
    }

    /// Feed a playback position into a running highlight
    ///
    /// Samples are rate-limited by the highlight's poll interval. Returns
    /// `true` if the highlighted word changed.
    pub fn sample_position(&mut self, now: Instant, position: f64) -> bool {
        match self.active.as_mut() {
            Some(Animation::Highlight(hl)) if hl.poll_due(now) => hl.sample(now, position),
            _ => false,
        }
    }

    /// End a running highlight, restoring plain text; safe to repeat
    pub fn clear_highlight(&mut self) {
        if let Some(Animation::Highlight(hl)) = self.active.as_mut() {
            hl.clear();
            self.active = None;
        }
    }

    /// Overlay text for a message, if it is the one being animated
    pub fn display_for(&self, message_id: &MessageId) -> Option<String> {
        match self.active.as_ref()? {
            Animation::Reveal(r) if r.message_id() == message_id => Some(r.frame()),
            Animation::Highlight(h) if h.message_id() == message_id => {
                Some(h.display().to_string())
            }
            _ => None,
        }
    }

    /// Message currently animated
    pub fn active_message(&self) -> Option<&MessageId> {
        self.active.as_ref().map(Animation::message_id)
    }

    /// Current animation, if any
    pub fn active(&self) -> Option<&Animation> {
        self.active.as_ref()
    }

    /// Whether a reveal is running
    pub fn is_revealing(&self) -> bool {
        matches!(self.active, Some(Animation::Reveal(_)))
    }

    /// Whether a highlight is running
    pub fn is_highlighting(&self) -> bool {
        matches!(self.active, Some(Animation::Highlight(_)))
    }
}
