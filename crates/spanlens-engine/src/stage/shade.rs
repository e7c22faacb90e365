use crate::atlas::CoverageSource;
use crate::coords::{ColorRgb, ColorRgba, Vec2};

/// Glyph fragment stage: `(color.r, color.g, color.b, coverage)`.
///
/// Coverage is the atlas red channel in `[0, 1]`. It is passed through as
/// alpha without clamping.
#[inline]
pub fn glyph_fragment(coverage: f32, color: ColorRgb) -> ColorRgba {
    color.with_alpha(coverage)
}

/// Samples `atlas` at `tex_coord` and applies [`glyph_fragment`].
#[inline]
pub fn shade_glyph<A>(tex_coord: Vec2, atlas: &A, color: ColorRgb) -> ColorRgba
where
    A: CoverageSource + ?Sized,
{
    glyph_fragment(atlas.sample(tex_coord), color)
}

/// Box fragment stage: flat fill, fully opaque.
#[inline]
pub fn box_fragment(color: ColorRgb) -> ColorRgba {
    color.with_alpha(1.0)
}
