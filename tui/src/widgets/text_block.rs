//! TextBlock Widget
//!
//! A borderless, scrollable block of prose used by the landing and
//! disclaimer screens. Paragraphs are wrapped with `textwrap` and may be
//! centered.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Scroll position of a text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Lines scrolled off the top
    pub scroll_offset: usize,
    /// Wrapped line count from the last render
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll by `delta` lines (positive = down); clamped on the next render
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }
}

/// One styled paragraph
#[derive(Clone, Debug)]
pub struct Paragraph<'a> {
    text: &'a str,
    style: Style,
}

impl<'a> Paragraph<'a> {
    /// A paragraph drawn in `style`
    pub fn new(text: &'a str, style: Style) -> Self {
        Self { text, style }
    }
}

/// A borderless, scrollable text block
#[derive(Clone, Debug, Default)]
pub struct TextBlock<'a> {
    paragraphs: Vec<Paragraph<'a>>,
    centered: bool,
}

impl<'a> TextBlock<'a> {
    /// Empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a paragraph; paragraphs are separated by a blank line
    #[must_use]
    pub fn paragraph(mut self, text: &'a str, style: Style) -> Self {
        self.paragraphs.push(Paragraph::new(text, style));
        self
    }

    /// Center every line horizontally
    #[must_use]
    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn wrapped(&self, width: usize) -> Vec<(String, Style)> {
        let mut lines = Vec::new();
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                lines.push((String::new(), Style::default()));
            }
            for line in paragraph.text.lines() {
                if line.is_empty() {
                    lines.push((String::new(), paragraph.style));
                    continue;
                }
                lines.extend(
                    wrap(line, width)
                        .into_iter()
                        .map(|cow| (cow.into_owned(), paragraph.style)),
                );
            }
        }
        lines
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let wrapped = self.wrapped(area.width as usize);
        state.total_lines = wrapped.len();

        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible = wrapped.iter().skip(state.scroll_offset);
        for (y, (line, style)) in (area.y..area.y + area.height).zip(visible) {
            let x = if self.centered {
                let width = u16::try_from(line.width()).unwrap_or(area.width);
                area.x + area.width.saturating_sub(width) / 2
            } else {
                area.x
            };
            buf.set_string(x, y, line, *style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.content[buf.index_of(x, y)].symbol())
            .collect::<String>()
    }

    #[test]
    fn test_paragraphs_wrap_with_gap() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        let mut state = TextBlockState::default();

        TextBlock::new()
            .paragraph("hello there world", Style::default())
            .paragraph("bye", Style::default())
            .render(area, &mut buf, &mut state);

        assert_eq!(state.total_lines, 5);
        assert_eq!(row(&buf, 0).trim_end(), "hello");
        assert_eq!(row(&buf, 2).trim_end(), "world");
        assert_eq!(row(&buf, 3).trim_end(), "");
        assert_eq!(row(&buf, 4).trim_end(), "bye");
    }

    #[test]
    fn test_centered_and_scroll_clamped() {
        let area = Rect::new(0, 0, 9, 1);
        let mut buf = Buffer::empty(area);
        let mut state = TextBlockState::default();
        state.scroll(10);

        TextBlock::new()
            .paragraph("abc", Style::default())
            .centered()
            .render(area, &mut buf, &mut state);

        assert_eq!(state.scroll_offset, 0);
        assert_eq!(row(&buf, 0), "   abc   ");
    }
}
