//! Word Highlight
//!
//! Marks the word currently being spoken. Repeated words are disambiguated
//! by position: the Nth timing entry for a word highlights the Nth
//! whitespace-separated occurrence of that word in the text.
//!
//! Words are compared after normalization (lowercase, alphanumerics only),
//! so `"The,"` in the text matches a timing for `"the"`. Surrounding
//! punctuation stays outside the marker.

use std::time::{Duration, Instant};

use crate::backend::WordTiming;
use crate::messages::MessageId;

/// Opening highlight marker
pub const MARK_OPEN: &str = "<mark>";

/// Closing highlight marker
pub const MARK_CLOSE: &str = "</mark>";

/// Lowercased alphanumeric form of a word
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Index of the timing whose `[start, end)` interval contains `position`
pub fn timing_index_at(timings: &[WordTiming], position: f64) -> Option<usize> {
    timings
        .iter()
        .position(|t| t.start <= position && position < t.end)
}

/// 1-based occurrence number of `timings[index]`'s word among `timings[0..=index]`
pub fn occurrence_index(timings: &[WordTiming], index: usize) -> usize {
    let Some(target) = timings.get(index) else {
        return 0;
    };
    let target = normalize_word(&target.word);
    timings[..=index]
        .iter()
        .filter(|t| normalize_word(&t.word) == target)
        .count()
}

/// Wrap the `occurrence`-th (1-based) textual occurrence of `word` in markers
///
/// Returns `None` if the word does not occur that many times, or normalizes
/// to nothing.
pub fn highlight_occurrence(text: &str, word: &str, occurrence: usize) -> Option<String> {
    let target = normalize_word(word);
    if target.is_empty() || occurrence == 0 {
        return None;
    }

    let mut seen = 0;
    for (start, token) in whitespace_tokens(text) {
        if normalize_word(token) != target {
            continue;
        }
        seen += 1;
        if seen < occurrence {
            continue;
        }

        let core_start = token
            .char_indices()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, _)| i)?;
        let core_end = token
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())?;

        let abs_start = start + core_start;
        let abs_end = start + core_end;
        let mut out = String::with_capacity(text.len() + MARK_OPEN.len() + MARK_CLOSE.len());
        out.push_str(&text[..abs_start]);
        out.push_str(MARK_OPEN);
        out.push_str(&text[abs_start..abs_end]);
        out.push_str(MARK_CLOSE);
        out.push_str(&text[abs_end..]);
        return Some(out);
    }
    None
}

/// Whitespace-separated tokens with their byte offsets
fn whitespace_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut tokens = Vec::new();
    let mut token_start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), token_start) {
            (true, Some(s)) => {
                tokens.push((s, &text[s..i]));
                token_start = None;
            }
            (false, None) => token_start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = token_start {
        tokens.push((s, &text[s..]));
    }
    tokens.into_iter()
}

/// Highlight state for one spoken reply
#[derive(Clone, Debug)]
pub struct WordHighlight {
    message_id: MessageId,
    text: String,
    timings: Vec<WordTiming>,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    current: Option<usize>,
    rendered: Option<String>,
}

impl WordHighlight {
    /// Begin highlighting `text` against `timings`
    pub fn new(
        message_id: MessageId,
        text: impl Into<String>,
        timings: Vec<WordTiming>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            message_id,
            text: text.into(),
            timings,
            poll_interval,
            last_poll: None,
            current: None,
            rendered: None,
        }
    }

    /// Message being highlighted
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Whether a new position sample is due at `now`
    pub fn poll_due(&self, now: Instant) -> bool {
        self.last_poll
            .map_or(true, |last| now.saturating_duration_since(last) >= self.poll_interval)
    }

    /// Sample the playback position taken at `now`
    ///
    /// Returns `true` if the highlighted word changed.
    pub fn sample(&mut self, now: Instant, position: f64) -> bool {
        self.last_poll = Some(now);
        self.update(position)
    }

    /// Re-render for a playback position (seconds)
    ///
    /// Returns `true` if the highlighted word changed. Positions between or
    /// after timings keep the previous highlight.
    pub fn update(&mut self, position: f64) -> bool {
        let Some(index) = timing_index_at(&self.timings, position) else {
            return false;
        };
        if self.current == Some(index) {
            return false;
        }

        let occurrence = occurrence_index(&self.timings, index);
        self.current = Some(index);
        self.rendered = highlight_occurrence(&self.text, &self.timings[index].word, occurrence);
        true
    }

    /// Index of the highlighted timing
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Text to show: marked-up when a word is highlighted, plain otherwise
    pub fn display(&self) -> &str {
        self.rendered.as_deref().unwrap_or(&self.text)
    }

    /// Remove any highlight and restore the plain text; safe to repeat
    pub fn clear(&mut self) {
        self.current = None;
        self.rendered = None;
    }

    /// Plain reply text
    pub fn text(&self) -> &str {
        &self.text
    }
}
