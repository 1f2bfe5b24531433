//! Layered Compositor
//!
//! Screen regions (sidebar, conversation, input bar, status line, dialogs)
//! each draw into their own layer. The compositor stacks the visible layers
//! by z-index into one output buffer.
//!
//! Transparent layers only overwrite cells that hold something other than a
//! blank, so the avatar can sit over the sidebar background. Opaque layers
//! (modal dialogs) replace everything in their bounds.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

pub use layer::Layer;

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u32);

/// Owns every layer and stacks them into the frame
pub struct Compositor {
    layers: HashMap<LayerId, Layer>,
    /// Back to front
    render_order: Vec<LayerId>,
    next_id: u32,
    output: Buffer,
    area: Rect,
}

impl Compositor {
    /// Create an empty compositor covering `area`
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_id: 0,
            output: Buffer::empty(area),
            area,
        }
    }

    /// Screen area
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Add a layer and return its ID
    pub fn create_layer(&mut self, bounds: Rect, z_index: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        self.layers.insert(id, Layer::new(id, bounds, z_index));
        self.update_render_order();
        id
    }

    /// Layer contents for drawing
    pub fn layer_buffer_mut(&mut self, id: LayerId) -> Option<&mut Buffer> {
        self.layers.get_mut(&id).map(|l| &mut l.buffer)
    }

    /// Move and resize a layer; the buffer is cleared only when the size changes
    pub fn place_layer(&mut self, id: LayerId, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(&id) {
            let resized =
                layer.bounds.width != bounds.width || layer.bounds.height != bounds.height;
            layer.bounds = bounds;
            if resized {
                layer.buffer = Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height));
            }
        }
    }

    /// Show or hide a layer
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.visible = visible;
        }
    }

    /// Make a layer cover everything beneath it
    pub fn set_opaque(&mut self, id: LayerId, opaque: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.opaque = opaque;
        }
    }

    /// Whether a layer is currently shown
    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|l| l.visible)
    }

    /// Resize the screen area
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
    }

    /// Stack all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id) {
                if layer.visible {
                    Self::blit_layer(&mut self.output, self.area, layer);
                }
            }
        }

        &self.output
    }

    fn blit_layer(output: &mut Buffer, area: Rect, layer: &Layer) {
        let lb = layer.bounds;

        for ly in 0..lb.height {
            for lx in 0..lb.width {
                let dst_x = lb.x.saturating_add(lx);
                let dst_y = lb.y.saturating_add(ly);
                if dst_x >= area.width || dst_y >= area.height {
                    continue;
                }

                let src_idx = layer.buffer.index_of(lx, ly);
                let Some(src_cell) = layer.buffer.content.get(src_idx) else {
                    continue;
                };

                if layer.opaque || src_cell.symbol() != " " {
                    let dst_idx = output.index_of(dst_x, dst_y);
                    if let Some(dst) = output.content.get_mut(dst_idx) {
                        *dst = src_cell.clone();
                    }
                }
            }
        }
    }

    /// Topmost visible layer at a screen position
    pub fn layer_at(&self, x: u16, y: u16) -> Option<LayerId> {
        self.render_order.iter().rev().copied().find(|id| {
            self.layers
                .get(id)
                .is_some_and(|layer| layer.visible && layer.contains(x, y))
        })
    }

    fn update_render_order(&mut self) {
        let mut order: Vec<(i32, LayerId)> =
            self.layers.values().map(|l| (l.z_index, l.id)).collect();
        order.sort_by_key(|&(z, id)| (z, id.0));
        self.render_order = order.into_iter().map(|(_, id)| id).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn symbol_at(buf: &Buffer, x: u16, y: u16) -> &str {
        buf.content[buf.index_of(x, y)].symbol()
    }

    #[test]
    fn test_higher_layer_wins() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        let back = compositor.create_layer(Rect::new(0, 0, 4, 1), 0);
        let front = compositor.create_layer(Rect::new(1, 0, 2, 1), 10);

        compositor
            .layer_buffer_mut(back)
            .unwrap()
            .set_string(0, 0, "aaaa", Style::default());
        compositor
            .layer_buffer_mut(front)
            .unwrap()
            .set_string(0, 0, "b", Style::default());

        let out = compositor.composite();
        assert_eq!(symbol_at(out, 0, 0), "a");
        assert_eq!(symbol_at(out, 1, 0), "b");
        // blank cell in a transparent layer shows what is beneath
        assert_eq!(symbol_at(out, 2, 0), "a");
    }

    #[test]
    fn test_opaque_layer_hides_background() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 3, 1));
        let back = compositor.create_layer(Rect::new(0, 0, 3, 1), 0);
        let modal = compositor.create_layer(Rect::new(0, 0, 3, 1), 100);
        compositor.set_opaque(modal, true);

        compositor
            .layer_buffer_mut(back)
            .unwrap()
            .set_string(0, 0, "xyz", Style::default());

        let out = compositor.composite();
        assert_eq!(symbol_at(out, 1, 0), " ");
    }

    #[test]
    fn test_hidden_layer_skipped() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 2, 1));
        let layer = compositor.create_layer(Rect::new(0, 0, 2, 1), 0);
        compositor
            .layer_buffer_mut(layer)
            .unwrap()
            .set_string(0, 0, "hi", Style::default());
        compositor.set_visible(layer, false);

        assert_eq!(symbol_at(compositor.composite(), 0, 0), " ");
        assert_eq!(compositor.layer_at(0, 0), None);
    }

    #[test]
    fn test_place_layer_keeps_buffer_on_move() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 10, 2));
        let layer = compositor.create_layer(Rect::new(0, 0, 2, 1), 0);
        compositor
            .layer_buffer_mut(layer)
            .unwrap()
            .set_string(0, 0, "ok", Style::default());

        compositor.place_layer(layer, Rect::new(5, 1, 2, 1));
        let out = compositor.composite();
        assert_eq!(symbol_at(out, 5, 1), "o");
        assert_eq!(compositor.layer_at(6, 1), Some(layer));

        compositor.place_layer(layer, Rect::new(5, 1, 3, 1));
        assert_eq!(symbol_at(compositor.composite(), 5, 1), " ");
    }
}
