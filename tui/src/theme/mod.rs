//! Theme and Colors
//!
//! The Red Queen palette: near-black panels, crimson accents and a cold
//! hologram red for the avatar.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Red Queen Palette
// ============================================================================

/// Panel background
pub const RQ_BLACK: Color = Color::Rgb(12, 10, 12);

/// Sidebar background, a shade lighter than the panels
pub const RQ_SIDEBAR: Color = Color::Rgb(24, 20, 24);

/// Signature crimson for titles and accents
pub const RQ_RED: Color = Color::Rgb(220, 38, 38);

/// Dimmed crimson for borders and inactive accents
pub const RQ_RED_DIM: Color = Color::Rgb(127, 29, 29);

/// Hologram glow used by the avatar
pub const HOLOGRAM: Color = Color::Rgb(255, 90, 90);

/// Hologram shadow
pub const HOLOGRAM_SHADOW: Color = Color::Rgb(150, 40, 40);

/// Avatar eyes
pub const HOLOGRAM_EYES: Color = Color::Rgb(255, 230, 230);

// ============================================================================
// UI Colors
// ============================================================================

/// Assistant message text
pub const ASSISTANT_TEXT: Color = Color::Rgb(230, 230, 230);

/// User message text
pub const USER_TEXT: Color = Color::Rgb(252, 165, 165);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);

/// Background of the spoken word
pub const HIGHLIGHT_BG: Color = Color::Rgb(250, 204, 21);

/// Foreground of the spoken word
pub const HIGHLIGHT_FG: Color = Color::Rgb(20, 20, 20);

/// Selection marker
pub const SELECTION: Color = Color::Rgb(250, 250, 250);

/// Storage warnings
pub const WARNING_YELLOW: Color = Color::Rgb(250, 204, 21);

/// Style of the currently spoken word
pub fn highlight_style() -> Style {
    Style::default()
        .fg(HIGHLIGHT_FG)
        .bg(HIGHLIGHT_BG)
        .add_modifier(Modifier::BOLD)
}

/// Style of section titles
pub fn title_style() -> Style {
    Style::default().fg(RQ_RED).add_modifier(Modifier::BOLD)
}
