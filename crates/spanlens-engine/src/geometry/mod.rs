//! Per-draw vertex and index buffers for the two pipelines.
//!
//! Each quad is four corners in the order `(x1, y1), (x1, y2), (x2, y2),
//! (x2, y1)` and two triangles `[i, i+1, i+2, i, i+2, i+3]`. Indices are
//! 16-bit, so one buffer holds at most [`MAX_QUADS`] quads.

mod boxes;
mod error;
mod glyphs;

pub use boxes::BoxGeometry;
pub use error::GeometryError;
pub use glyphs::{GlyphGeometry, GlyphVertex};

use crate::coords::Rect;

/// Quads addressable with `u16` indices.
pub const MAX_QUADS: usize = (u16::MAX as usize + 1) / 4;

/// Index pattern of one quad starting at vertex `base`.
#[inline]
pub(crate) fn quad_indices(base: u16) -> [u16; 6] {
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

/// Corner order shared by positions and texture coordinates.
#[inline]
pub(crate) fn quad_corners(min: [f32; 2], max: [f32; 2]) -> [[f32; 2]; 4] {
    [
        [min[0], min[1]],
        [min[0], max[1]],
        [max[0], max[1]],
        [max[0], min[1]],
    ]
}

/// Base vertex index for the next quad, or an overflow error.
#[inline]
pub(crate) fn next_base(vertex_count: usize) -> Result<u16, GeometryError> {
    if vertex_count / 4 >= MAX_QUADS {
        return Err(GeometryError::IndexOverflow { quads: vertex_count / 4 });
    }
    Ok(vertex_count as u16)
}

#[inline]
pub(crate) fn rect_corners(rect: Rect) -> [[f32; 2]; 4] {
    quad_corners(rect.min().to_array(), rect.max().to_array())
}
