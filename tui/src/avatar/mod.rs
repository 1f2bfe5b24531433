//! Avatar - The Red Queen Hologram
//!
//! A small animated face in the sidebar. It loops `idle` while the chat is
//! quiet and switches to `talking` while a request is in flight or a reply
//! is being spoken. A compact variant is drawn when the sidebar is
//! collapsed.

mod sprites;

use std::collections::HashMap;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::style::Style;

pub use sprites::{build_frame, ColoredCell, Frame};

use sprites::{compact_sheet, full_sheet, SpriteSheet};

/// Avatar size variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AvatarSize {
    /// Collapsed sidebar
    Compact,
    /// Expanded sidebar
    Full,
}

/// The animated hologram
pub struct Avatar {
    sheets: HashMap<AvatarSize, SpriteSheet>,
    size: AvatarSize,
    animation: &'static str,
    frame_index: usize,
    frame_time: Duration,
}

impl Avatar {
    /// Idle, full-size avatar
    pub fn new() -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(AvatarSize::Full, full_sheet());
        sheets.insert(AvatarSize::Compact, compact_sheet());
        Self {
            sheets,
            size: AvatarSize::Full,
            animation: "idle",
            frame_index: 0,
            frame_time: Duration::ZERO,
        }
    }

    /// Advance by `delta` (call every frame)
    pub fn update(&mut self, delta: Duration) {
        let Some(frames) = self.frames() else {
            return;
        };
        let count = frames.len();
        let Some(frame) = frames.get(self.frame_index % count) else {
            return;
        };
        let frame_duration = Duration::from_millis(frame.duration_ms);

        self.frame_time += delta;
        if self.frame_time >= frame_duration {
            self.frame_time = Duration::ZERO;
            self.frame_index = (self.frame_index + 1) % count;
        }
    }

    /// Follow the chat's talking state
    pub fn set_talking(&mut self, talking: bool) {
        let name = if talking { "talking" } else { "idle" };
        if self.animation != name {
            self.animation = name;
            self.frame_index = 0;
            self.frame_time = Duration::ZERO;
        }
    }

    /// Whether the talking loop is playing
    pub fn is_talking(&self) -> bool {
        self.animation == "talking"
    }

    /// Switch between compact and full sprites
    pub fn set_size(&mut self, size: AvatarSize) {
        if self.size != size {
            self.size = size;
            self.frame_index = 0;
        }
    }

    /// Width and height of the current frame
    pub fn bounds(&self) -> (u16, u16) {
        self.current_frame().map_or((0, 0), |f| (f.width, f.height))
    }

    fn frames(&self) -> Option<&[Frame]> {
        let animation = self.sheets.get(&self.size)?.get(self.animation)?;
        (!animation.frames.is_empty()).then_some(animation.frames.as_slice())
    }

    /// Frame to draw now
    pub fn current_frame(&self) -> Option<&Frame> {
        let frames = self.frames()?;
        frames.get(self.frame_index % frames.len())
    }

    /// Draw the current frame centered in `buf`; blank cells stay transparent
    pub fn render(&self, buf: &mut Buffer) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let area = buf.area;
        let x_offset = area.width.saturating_sub(frame.width) / 2;
        let y_offset = area.height.saturating_sub(frame.height) / 2;

        for (dy, row) in (0..area.height.saturating_sub(y_offset)).zip(&frame.cells) {
            for (dx, cell) in (0..area.width.saturating_sub(x_offset)).zip(row) {
                if cell.is_empty() {
                    continue;
                }
                let x = area.x + x_offset + dx;
                let y = area.y + y_offset + dy;
                if let Some(target) = buf.cell_mut((x, y)) {
                    target.set_char(cell.ch).set_style(Style::default().fg(cell.fg));
                }
            }
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new()
    }
}
