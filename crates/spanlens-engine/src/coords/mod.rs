//! Coordinate and color types shared by the stage functions, the software
//! rasterizer and the GPU renderers.
//!
//! Canonical CPU space:
//! - Source pixels (whatever unit the caller's geometry uses)
//! - Origin top-left
//! - +X right, +Y down
//!
//! A [`ViewRect`] selects the visible window of that space; vertex stages map
//! it onto clip space with Y flipped.

mod clip;
mod color;
mod rect;
mod vec2;
mod view_rect;

pub use clip::ClipPos;
pub use color::{ColorRgb, ColorRgba};
pub use rect::Rect;
pub use vec2::Vec2;
pub use view_rect::ViewRect;
