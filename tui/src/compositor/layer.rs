//! A single compositor layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// An independently drawn region of the screen
///
/// The buffer is always anchored at the origin; `bounds` places it on screen.
pub struct Layer {
    /// Layer ID
    pub id: LayerId,
    /// Position and size on screen
    pub bounds: Rect,
    /// Stacking order (higher draws on top)
    pub z_index: i32,
    /// Hidden layers are skipped when compositing
    pub visible: bool,
    /// Opaque layers cover everything beneath them, blanks included
    pub opaque: bool,
    /// Layer contents
    pub buffer: Buffer,
}

impl Layer {
    /// Create a transparent, visible layer
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            bounds,
            z_index,
            visible: true,
            opaque: false,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    /// Whether a screen position falls inside this layer
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && x < self.bounds.x.saturating_add(self.bounds.width)
            && y >= self.bounds.y
            && y < self.bounds.y.saturating_add(self.bounds.height)
    }
}
