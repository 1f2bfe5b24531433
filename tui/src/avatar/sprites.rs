//! Sprite Definitions
//!
//! The Red Queen as a small hologram: a girl's face drawn with block
//! elements in glowing red. Each size has an `idle` loop (slow flicker and
//! blink) and a `talking` loop (mouth moves).

use std::collections::HashMap;

use ratatui::style::Color;

use crate::theme::{HOLOGRAM, HOLOGRAM_EYES, HOLOGRAM_SHADOW, RQ_RED};

/// A single colored cell in a sprite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColoredCell {
    /// Character to draw
    pub ch: char,
    /// Foreground color
    pub fg: Color,
}

impl ColoredCell {
    const EMPTY: Self = Self {
        ch: ' ',
        fg: Color::Reset,
    };

    /// Whether the cell is transparent
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
    }
}

/// One animation frame
#[derive(Clone, Debug)]
pub struct Frame {
    /// Rows of cells
    pub cells: Vec<Vec<ColoredCell>>,
    /// Width in terminal cells
    pub width: u16,
    /// Height in terminal cells
    pub height: u16,
    /// How long the frame stays up
    pub duration_ms: u64,
}

/// A looping frame sequence
#[derive(Clone, Debug)]
pub struct Animation {
    /// Frames in order
    pub frames: Vec<Frame>,
}

/// Animations for one avatar size, by name
pub type SpriteSheet = HashMap<&'static str, Animation>;

/// Palette entry: pattern key, drawn character, color
type PaletteEntry = (char, char, Color);

/// Build a frame from a pattern; unknown keys draw themselves uncolored
pub fn build_frame(pattern: &[&str], palette: &[PaletteEntry], duration_ms: u64) -> Frame {
    let lookup: HashMap<char, (char, Color)> = palette
        .iter()
        .map(|&(key, ch, color)| (key, (ch, color)))
        .collect();

    let cells: Vec<Vec<ColoredCell>> = pattern
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| match (c, lookup.get(&c)) {
                    (' ', _) => ColoredCell::EMPTY,
                    (_, Some(&(ch, fg))) => ColoredCell { ch, fg },
                    (ch, None) => ColoredCell {
                        ch,
                        fg: Color::Reset,
                    },
                })
                .collect()
        })
        .collect();

    let height = u16::try_from(cells.len()).unwrap_or(u16::MAX);
    let width = cells
        .iter()
        .map(|row| u16::try_from(row.len()).unwrap_or(u16::MAX))
        .max()
        .unwrap_or(0);

    Frame {
        cells,
        width,
        height,
        duration_ms,
    }
}

fn build_animation(frames: &[(&[&str], u64)], palette: &[PaletteEntry]) -> Animation {
    Animation {
        frames: frames
            .iter()
            .map(|(pattern, ms)| build_frame(pattern, palette, *ms))
            .collect(),
    }
}

// Palette keys:
// H = hologram body, h = shadow, T/L = upper/lower half blocks
// o = open eye, - = closed eye, m/O = mouth closed/open, ~ = scanline flicker
fn palette() -> Vec<PaletteEntry> {
    vec![
        ('H', '█', HOLOGRAM),
        ('h', '█', HOLOGRAM_SHADOW),
        ('T', '▀', HOLOGRAM),
        ('L', '▄', HOLOGRAM),
        ('t', '▀', HOLOGRAM_SHADOW),
        ('l', '▄', HOLOGRAM_SHADOW),
        ('o', '●', HOLOGRAM_EYES),
        ('-', '─', HOLOGRAM_EYES),
        ('m', '─', RQ_RED),
        ('O', '◡', RQ_RED),
        ('~', '░', HOLOGRAM_SHADOW),
    ]
}

/// Sheet for the sidebar avatar
pub fn full_sheet() -> SpriteSheet {
    let p = palette();

    const OPEN: &[&str] = &[
        "  lLLLLLl  ",
        " hHHHHHHHh ",
        " H o   o H ",
        " H   m   H ",
        "  tHHHHHt  ",
        "    hHh    ",
    ];
    const BLINK: &[&str] = &[
        "  lLLLLLl  ",
        " hHHHHHHHh ",
        " H -   - H ",
        " H   m   H ",
        "  tHHHHHt  ",
        "    hHh    ",
    ];
    const FLICKER: &[&str] = &[
        "  lLLLLLl  ",
        " ~~~~~~~~~ ",
        " H o   o H ",
        " H   m   H ",
        "  tHHHHHt  ",
        "    hHh    ",
    ];
    const SPEAK: &[&str] = &[
        "  lLLLLLl  ",
        " hHHHHHHHh ",
        " H o   o H ",
        " H   O   H ",
        "  tHHHHHt  ",
        "    hHh    ",
    ];

    let mut sheet = SpriteSheet::new();
    sheet.insert(
        "idle",
        build_animation(
            &[(OPEN, 2400), (BLINK, 150), (OPEN, 1800), (FLICKER, 80)],
            &p,
        ),
    );
    sheet.insert(
        "talking",
        build_animation(&[(OPEN, 160), (SPEAK, 160), (OPEN, 120), (SPEAK, 200)], &p),
    );
    sheet
}

/// Sheet for the collapsed-sidebar avatar
pub fn compact_sheet() -> SpriteSheet {
    let p = palette();

    const OPEN: &[&str] = &["lLLLl", "HoHoH", "tHmHt"];
    const BLINK: &[&str] = &["lLLLl", "H-H-H", "tHmHt"];
    const SPEAK: &[&str] = &["lLLLl", "HoHoH", "tHOHt"];

    let mut sheet = SpriteSheet::new();
    sheet.insert("idle", build_animation(&[(OPEN, 2600), (BLINK, 150)], &p));
    sheet.insert("talking", build_animation(&[(OPEN, 160), (SPEAK, 180)], &p));
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_frame_measures_pattern() {
        let frame = build_frame(&["Ho", " H?"], &palette(), 100);
        assert_eq!(frame.width, 3);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.cells[0][0].ch, '█');
        assert!(frame.cells[1][0].is_empty());
        assert_eq!(frame.cells[1][2].ch, '?');
    }

    #[test]
    fn test_sheets_have_both_loops() {
        for sheet in [full_sheet(), compact_sheet()] {
            assert!(sheet.contains_key("idle"));
            assert!(sheet.contains_key("talking"));
            assert!(sheet.values().all(|a| !a.frames.is_empty()));
        }
    }
}
