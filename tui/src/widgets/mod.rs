//! Reusable widgets

mod modal;
mod text_block;

pub use modal::{centered_rect, Modal};
pub use text_block::{TextBlock, TextBlockState};
