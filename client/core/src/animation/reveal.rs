//! Character Reveal
//!
//! Reveals a finished reply one character per interval. Progress is derived
//! from elapsed time rather than counted ticks, so a slow frame loop skips
//! ahead instead of falling behind.

use std::time::{Duration, Instant};

use crate::messages::MessageId;

/// Glyph appended while a reveal is incomplete
pub const REVEAL_CURSOR: char = '▌';

/// One in-progress character reveal
#[derive(Clone, Debug)]
pub struct TypingReveal {
    message_id: MessageId,
    chars: Vec<char>,
    interval: Duration,
    started_at: Instant,
    revealed: usize,
}

impl TypingReveal {
    /// Start revealing `text` at `now`
    pub fn new(message_id: MessageId, text: &str, interval: Duration, now: Instant) -> Self {
        Self {
            message_id,
            chars: text.chars().collect(),
            interval,
            started_at: now,
            revealed: 0,
        }
    }

    /// Message being revealed
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Advance to the number of characters due at `now`
    ///
    /// Returns `true` if the visible frame changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.started_at);
        let due = if self.interval.is_zero() {
            self.chars.len()
        } else {
            (elapsed.as_nanos() / self.interval.as_nanos()) as usize
        };
        let next = due.min(self.chars.len()).max(self.revealed);
        let changed = next != self.revealed;
        self.revealed = next;
        changed
    }

    /// Number of characters currently visible
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Whether the whole text is visible
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    /// Current frame: revealed prefix, plus the cursor while incomplete
    pub fn frame(&self) -> String {
        let mut out: String = self.chars[..self.revealed].iter().collect();
        if !self.is_complete() {
            out.push(REVEAL_CURSOR);
        }
        out
    }
}
