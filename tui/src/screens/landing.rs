//! Landing Screen

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::StatefulWidget;

use crate::theme::{self, ASSISTANT_TEXT, DIM_GRAY, RQ_RED};
use crate::widgets::{TextBlock, TextBlockState};

/// Title line
pub const TITLE: &str = "R E D   Q U E E N";

const TAGLINE: &str = "The Hive's artificial intelligence, now taking your questions.";

const FEATURES: &str = "\
Ask about the Umbrella Corporation, the Hive and everything in between.
Keep separate conversations and come back to them later.
Hear her answer, word by word, when audio is available.";

const KEYS: &str = "Enter  start chatting     d  disclaimer     q  quit";

/// Draw the landing page into a full-screen buffer
pub fn render(buf: &mut Buffer, state: &mut TextBlockState) {
    buf.reset();
    let area = buf.area;
    if area.height < 3 {
        return;
    }

    let top = area.height / 4;
    let body = Rect::new(
        area.x + 2,
        area.y + top,
        area.width.saturating_sub(4),
        area.height.saturating_sub(top + 2),
    );

    TextBlock::new()
        .paragraph(TITLE, theme::title_style())
        .paragraph(
            TAGLINE,
            Style::default().fg(ASSISTANT_TEXT).add_modifier(Modifier::ITALIC),
        )
        .paragraph(FEATURES, Style::default().fg(DIM_GRAY))
        .paragraph(KEYS, Style::default().fg(RQ_RED))
        .centered()
        .render(body, buf, state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_shows_title_and_keys() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, 24));
        render(&mut buf, &mut TextBlockState::default());
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains(TITLE));
        assert!(text.contains("start chatting"));
    }
}
