//! Modal Widget
//!
//! A bordered box with a title, body lines and a key hint along the bottom.
//! Used for the session menu, the delete confirmation and the rename field.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Widget};

use crate::theme::{self, DIM_GRAY, RQ_BLACK, RQ_RED_DIM};

/// Box drawn over the chat screen
#[derive(Clone, Debug)]
pub struct Modal<'a> {
    title: &'a str,
    lines: Vec<Line<'a>>,
    hint: &'a str,
}

impl<'a> Modal<'a> {
    /// Empty modal with a title
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            lines: Vec::new(),
            hint: "",
        }
    }

    /// Body lines, top to bottom
    #[must_use]
    pub fn lines(mut self, lines: Vec<Line<'a>>) -> Self {
        self.lines = lines;
        self
    }

    /// Key hint shown on the last inner row
    #[must_use]
    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }

    /// Size that fits the content, capped to `max`
    pub fn size(&self, max: Rect) -> (u16, u16) {
        let content_width = self
            .lines
            .iter()
            .map(Line::width)
            .chain([self.title.len() + 2, self.hint.len()])
            .max()
            .unwrap_or(0);
        let width = u16::try_from(content_width + 4).unwrap_or(u16::MAX);
        let height = u16::try_from(self.lines.len() + 4).unwrap_or(u16::MAX);
        (width.min(max.width), height.min(max.height))
    }
}

impl Widget for Modal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(RQ_RED_DIM))
            .title(Line::styled(format!(" {} ", self.title), theme::title_style()))
            .style(Style::default().bg(RQ_BLACK));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 2 || inner.height == 0 {
            return;
        }

        let body_rows = inner.height.saturating_sub(1);
        for (y, line) in (inner.y..inner.y + body_rows).zip(self.lines.iter()) {
            buf.set_line(inner.x + 1, y, line, inner.width - 1);
        }

        buf.set_string(
            inner.x + 1,
            inner.y + inner.height - 1,
            self.hint,
            Style::default().fg(DIM_GRAY),
        );
    }
}

/// Rectangle of `width` x `height` centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_fits_content() {
        let modal = Modal::new("Delete Chat Session")
            .lines(vec![Line::raw("This action cannot be undone.")])
            .hint("y confirm  n cancel");
        let (w, h) = modal.size(Rect::new(0, 0, 80, 24));
        assert_eq!(w, 33);
        assert_eq!(h, 5);

        let (w, _) = modal.size(Rect::new(0, 0, 20, 24));
        assert_eq!(w, 20);
    }

    #[test]
    fn test_modal_draws_title_and_body() {
        let area = Rect::new(0, 0, 34, 5);
        let mut buf = Buffer::empty(area);
        Modal::new("Delete Chat Session")
            .lines(vec![Line::raw("This action cannot be undone.")])
            .hint("y/n")
            .render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf.content[buf.index_of(x, y)].symbol())
                .collect()
        };
        assert!(row(0).contains("Delete Chat Session"));
        assert!(row(1).contains("This action cannot be undone."));
        assert!(row(3).contains("y/n"));
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(Rect::new(0, 0, 20, 10), 10, 4);
        assert_eq!(r, Rect::new(5, 3, 10, 4));
    }
}
