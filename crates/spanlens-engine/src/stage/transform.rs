use crate::coords::{ClipPos, Vec2, ViewRect};

/// Maps a source-pixel position into clip space.
///
/// ```text
/// clip.xy = (-1, 1) + (2, -2) * (pos - (x, y)) / (w, h)
/// clip.z  = 0
/// clip.w  = 1
/// ```
///
/// Y is flipped (source +Y down, clip +Y up). Positions outside `view` land
/// outside `[-1, 1]` and are left for the rasterizer to clip. A zero-sized
/// `view` divides by zero.
#[inline]
pub fn view_to_clip(pos: Vec2, view: ViewRect) -> ClipPos {
    let rel = (pos - view.origin()).div_elem(view.size());
    let xy = Vec2::new(-1.0, 1.0) + Vec2::new(2.0, -2.0).mul_elem(rel);
    ClipPos::new(xy.x, xy.y, 0.0, 1.0)
}

/// Box pipeline vertex stage.
#[inline]
pub fn box_vertex(pos: Vec2, view: ViewRect) -> ClipPos {
    view_to_clip(pos, view)
}

/// Glyph vertex stage output.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphVaryings {
    pub clip: ClipPos,
    /// Forwarded unchanged; interpolated across the primitive.
    pub tex_coord: Vec2,
}

/// Glyph pipeline vertex stage.
#[inline]
pub fn glyph_vertex(pos: Vec2, tex_coord: Vec2, view: ViewRect) -> GlyphVaryings {
    GlyphVaryings {
        clip: view_to_clip(pos, view),
        tex_coord,
    }
}
