//! Shape renderers.

mod common;

pub mod boxes;
pub mod glyphs;

pub use boxes::BoxRenderer;
pub use glyphs::GlyphRenderer;
