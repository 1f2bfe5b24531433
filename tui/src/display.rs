//! Display Conversion
//!
//! Turns what the controller says a message looks like right now (stored
//! text, a reveal frame with its cursor, or highlight markup) into styled,
//! wrapped ratatui lines. Nothing here touches session state.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use redqueen_core::animation::REVEAL_CURSOR;
use redqueen_core::{ChatMessage, MARK_CLOSE, MARK_OPEN};

use crate::theme::{self, ASSISTANT_TEXT, DIM_GRAY, RQ_RED, SELECTION, USER_TEXT};

/// Label shown above assistant messages
pub const ASSISTANT_LABEL: &str = "Red Queen";

/// Label shown above user messages
pub const USER_LABEL: &str = "You";

/// Text of a pending placeholder
pub const THINKING: &str = "Thinking...";

/// How a run of message text should be drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary text
    Plain,
    /// The word currently being spoken
    Highlight,
    /// Reveal cursor
    Cursor,
}

/// A run of text with one presentation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Text of the run
    pub text: String,
    /// How to draw it
    pub kind: SegmentKind,
}

impl Segment {
    fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Split display text into plain, highlighted and cursor runs
///
/// An unmatched opening marker is shown literally.
pub fn parse_markup(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(MARK_OPEN) {
        let after_open = &rest[open + MARK_OPEN.len()..];
        let Some(close) = after_open.find(MARK_CLOSE) else {
            break;
        };
        push_plain(&mut segments, &rest[..open]);
        if close > 0 {
            segments.push(Segment::new(&after_open[..close], SegmentKind::Highlight));
        }
        rest = &after_open[close + MARK_CLOSE.len()..];
    }
    push_plain(&mut segments, rest);
    segments
}

fn push_plain(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match text.strip_suffix(REVEAL_CURSOR) {
        Some(body) => {
            if !body.is_empty() {
                segments.push(Segment::new(body, SegmentKind::Plain));
            }
            segments.push(Segment::new(REVEAL_CURSOR, SegmentKind::Cursor));
        }
        None => segments.push(Segment::new(text, SegmentKind::Plain)),
    }
}

/// Greedy word wrap that keeps per-character styles
///
/// Words longer than `width` are split. Explicit newlines start new lines.
pub fn wrap_styled(chars: &[(char, Style)], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in chars.split(|&(c, _)| c == '\n') {
        let mut current: Vec<(char, Style)> = Vec::new();
        let mut current_width = 0;

        for token in tokens(paragraph) {
            let token_width: usize = token.iter().map(|&(c, _)| char_width(c)).sum();
            let is_space = token.first().is_some_and(|&(c, _)| c.is_whitespace());

            if current_width + token_width <= width {
                current.extend_from_slice(token);
                current_width += token_width;
                continue;
            }

            if is_space {
                // breaking at whitespace swallows it
                lines.push(to_line(&std::mem::take(&mut current)));
                current_width = 0;
                continue;
            }

            if !current.is_empty() {
                lines.push(to_line(&std::mem::take(&mut current)));
                current_width = 0;
            }

            for &(c, style) in token {
                let w = char_width(c);
                if current_width + w > width && !current.is_empty() {
                    lines.push(to_line(&std::mem::take(&mut current)));
                    current_width = 0;
                }
                current.push((c, style));
                current_width += w;
            }
        }

        lines.push(to_line(&current));
    }

    lines
}

/// Runs of whitespace and non-whitespace
fn tokens(chars: &[(char, Style)]) -> Vec<&[(char, Style)]> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=chars.len() {
        let boundary =
            i == chars.len() || chars[i].0.is_whitespace() != chars[start].0.is_whitespace();
        if boundary {
            out.push(&chars[start..i]);
            start = i;
        }
    }
    out
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn to_line(chars: &[(char, Style)]) -> Line<'static> {
    let end = chars
        .iter()
        .rposition(|&(c, _)| !c.is_whitespace())
        .map_or(0, |i| i + 1);
    let chars = &chars[..end];

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = None;

    for &(c, style) in chars {
        if run_style != Some(style) {
            if let Some(s) = run_style {
                spans.push(Span::styled(std::mem::take(&mut run), s));
            }
            run_style = Some(style);
        }
        run.push(c);
    }
    if let Some(s) = run_style {
        spans.push(Span::styled(run, s));
    }
    Line::from(spans)
}

/// Width of a line in terminal cells
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans.iter().map(|s| s.width()).sum()
}

/// Inputs for drawing one message
#[derive(Clone, Debug)]
pub struct MessageView<'a> {
    /// The stored message
    pub message: &'a ChatMessage,
    /// What the controller wants shown for it right now
    pub content: String,
    /// Whether it is the message selected for edit/delete
    pub selected: bool,
    /// Whether the placeholder's dot is lit this frame
    pub pulse_on: bool,
}

/// Header plus wrapped body for one message, followed by a blank spacer
///
/// User messages are right-aligned within `width`.
pub fn message_lines(view: &MessageView<'_>, width: usize) -> Vec<Line<'static>> {
    let is_user = view.message.is_user();
    let (label, color) = if is_user {
        (USER_LABEL, USER_TEXT)
    } else {
        (ASSISTANT_LABEL, RQ_RED)
    };

    let mut header_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if view.selected {
        header_style = header_style.add_modifier(Modifier::REVERSED);
    }
    let marker = if view.selected { "> " } else { "" };
    let header = Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(SELECTION)),
        Span::styled(label.to_string(), header_style),
    ]);

    let body = if view.message.is_loading {
        let dot = if view.pulse_on { " ●" } else { " ○" };
        vec![Line::from(vec![
            Span::styled(THINKING, Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC)),
            Span::styled(dot, Style::default().fg(RQ_RED)),
        ])]
    } else {
        let base = Style::default().fg(if is_user { USER_TEXT } else { ASSISTANT_TEXT });
        wrap_styled(&styled_chars(&view.content, base), width)
    };

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(header);
    lines.extend(body);
    if is_user {
        lines = lines
            .into_iter()
            .map(|line| align_right(line, width))
            .collect();
    }
    lines.push(Line::default());
    lines
}

/// Expand display text into per-character styles
pub fn styled_chars(text: &str, base: Style) -> Vec<(char, Style)> {
    let cursor_style = Style::default().fg(RQ_RED);
    parse_markup(text)
        .into_iter()
        .flat_map(|segment| {
            let style = match segment.kind {
                SegmentKind::Plain => base,
                SegmentKind::Highlight => theme::highlight_style(),
                SegmentKind::Cursor => cursor_style,
            };
            segment.text.chars().map(move |c| (c, style)).collect::<Vec<_>>()
        })
        .collect()
}

fn align_right(mut line: Line<'static>, width: usize) -> Line<'static> {
    let pad = width.saturating_sub(line_width(&line));
    if pad > 0 {
        line.spans.insert(0, Span::raw(" ".repeat(pad)));
    }
    line
}

/// Short creation date for the session list (local time)
pub fn session_date(created: Option<chrono::DateTime<chrono::FixedOffset>>) -> String {
    created.map_or_else(String::new, |dt| {
        dt.with_timezone(&chrono::Local).format("%b %d, %H:%M").to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_parse_highlight_markup() {
        assert_eq!(
            parse_markup("the cat <mark>the</mark>!"),
            vec![
                Segment::new("the cat ", SegmentKind::Plain),
                Segment::new("the", SegmentKind::Highlight),
                Segment::new("!", SegmentKind::Plain),
            ]
        );
    }

    #[test]
    fn test_parse_reveal_cursor() {
        assert_eq!(
            parse_markup("Hel▌"),
            vec![
                Segment::new("Hel", SegmentKind::Plain),
                Segment::new("▌", SegmentKind::Cursor),
            ]
        );
        assert_eq!(parse_markup("▌"), vec![Segment::new("▌", SegmentKind::Cursor)]);
    }

    #[test]
    fn test_unclosed_marker_is_literal() {
        assert_eq!(
            parse_markup("a <mark>b"),
            vec![Segment::new("a <mark>b", SegmentKind::Plain)]
        );
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let chars = styled_chars("the quick brown fox", Style::default());
        let lines: Vec<String> = wrap_styled(&chars, 10).iter().map(plain).collect();
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_wrap_splits_long_words_and_keeps_newlines() {
        let chars = styled_chars("abcdefgh\nxy", Style::default());
        let lines: Vec<String> = wrap_styled(&chars, 3).iter().map(plain).collect();
        assert_eq!(lines, vec!["abc", "def", "gh", "xy"]);
    }

    #[test]
    fn test_highlight_survives_wrapping() {
        let chars = styled_chars("one two <mark>three</mark>", Style::default());
        let lines = wrap_styled(&chars, 8);
        assert_eq!(lines.len(), 2);
        let spoken = &lines[1].spans[0];
        assert_eq!(spoken.content, "three");
        assert_eq!(spoken.style, theme::highlight_style());
    }

    #[test]
    fn test_placeholder_renders_thinking() {
        let message = ChatMessage::placeholder();
        let view = MessageView {
            message: &message,
            content: String::new(),
            selected: false,
            pulse_on: true,
        };
        let lines = message_lines(&view, 40);
        assert_eq!(plain(&lines[1]), "Thinking... ●");
    }

    #[test]
    fn test_user_message_is_right_aligned() {
        let message = ChatMessage::user("hi");
        let view = MessageView {
            message: &message,
            content: "hi".into(),
            selected: false,
            pulse_on: false,
        };
        let lines = message_lines(&view, 10);
        assert_eq!(plain(&lines[0]), "       You");
        assert_eq!(plain(&lines[1]), "        hi");
        assert!(plain(&lines[2]).is_empty());
    }
}
