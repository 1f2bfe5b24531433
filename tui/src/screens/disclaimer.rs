//! Disclaimer Screen
//!
//! The legal notice reachable from the landing page. `Esc` or `Enter` goes
//! back to wherever it was opened from.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::StatefulWidget;

use crate::theme::{self, ASSISTANT_TEXT, DIM_GRAY};
use crate::widgets::{TextBlock, TextBlockState};

const HEADING: &str = "⚠  Disclaimer";

/// Copyright notice
pub const NOTICE: &str = "© All fictional lore, characters, names (\"Red Queen,\" \"Umbrella\"), \
and plot details are the copyrighted and trademarked intellectual property of Capcom Co., Ltd. \
and are used here for commentary, criticism, and transformative educational purposes only.";

const AFFILIATION: &str = "This project is not affiliated with, endorsed by, or sponsored by \
Capcom. No claim of ownership is made over the source materials used for the RAG knowledge base.";

/// Closing line
pub const EDUCATIONAL: &str = "This is for educational use only.";

const CLOSE_HINT: &str = "[ Esc ] Close";

/// Draw the disclaimer into a full-screen buffer
pub fn render(buf: &mut Buffer, state: &mut TextBlockState) {
    buf.reset();
    let area = buf.area;
    let width = area.width.saturating_sub(4).min(76);
    let body = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + 2,
        width,
        area.height.saturating_sub(3),
    );

    TextBlock::new()
        .paragraph(HEADING, theme::title_style())
        .paragraph(NOTICE, Style::default().fg(ASSISTANT_TEXT))
        .paragraph(AFFILIATION, Style::default().fg(ASSISTANT_TEXT))
        .paragraph(
            EDUCATIONAL,
            Style::default().fg(ASSISTANT_TEXT).add_modifier(Modifier::BOLD),
        )
        .paragraph(CLOSE_HINT, Style::default().fg(DIM_GRAY))
        .render(body, buf, state);
}
