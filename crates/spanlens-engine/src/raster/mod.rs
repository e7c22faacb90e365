//! Software rasterizer running the box and glyph pipelines on the CPU.
//!
//! Vertices go through the same stage functions as the WGSL shaders, clip
//! positions are mapped to framebuffer pixels, triangles are filled at pixel
//! centers (top-left fill rule), and fragments are blended source-over.
//! Useful for headless output and for checking pipeline behavior without a
//! GPU adapter.

mod error;
mod framebuffer;
mod triangle;

pub use error::RasterError;
pub use framebuffer::Framebuffer;

use crate::atlas::CoverageSource;
use crate::coords::{ColorRgb, Vec2, ViewRect};
use crate::geometry::{BoxGeometry, GlyphGeometry};
use crate::stage;

use triangle::{fill_triangle, ScreenVertex};

/// Rasterizes `geometry` with the box pipeline.
pub fn draw_boxes(fb: &mut Framebuffer, geometry: &BoxGeometry, view: ViewRect, color: ColorRgb) {
    if !check_draw(view, geometry.is_empty(), "boxes") {
        return;
    }
    let fragment = stage::box_fragment(color);

    'tris: for tri in geometry.indices.chunks_exact(3) {
        let mut verts = [ScreenVertex::default(); 3];
        for (slot, &index) in verts.iter_mut().zip(tri) {
            let Some(&pos) = geometry.positions.get(index as usize) else {
                log::warn!("box index {index} out of range; triangle skipped");
                continue 'tris;
            };
            let clip = stage::box_vertex(Vec2::from(pos), view);
            *slot = ScreenVertex::from_clip(clip, Vec2::zero(), fb.width(), fb.height());
        }
        fill_triangle(fb, verts, |_| fragment);
    }
}

/// Rasterizes `geometry` with the glyph pipeline, sampling `atlas`.
pub fn draw_glyphs<A>(
    fb: &mut Framebuffer,
    geometry: &GlyphGeometry,
    view: ViewRect,
    color: ColorRgb,
    atlas: &A,
) where
    A: CoverageSource + ?Sized,
{
    if !check_draw(view, geometry.is_empty(), "glyphs") {
        return;
    }

    'tris: for tri in geometry.indices.chunks_exact(3) {
        let mut verts = [ScreenVertex::default(); 3];
        for (slot, &index) in verts.iter_mut().zip(tri) {
            let Some(v) = geometry.vertices.get(index as usize) else {
                log::warn!("glyph index {index} out of range; triangle skipped");
                continue 'tris;
            };
            let out = stage::glyph_vertex(Vec2::from(v.pos), Vec2::from(v.tex_coord), view);
            *slot = ScreenVertex::from_clip(out.clip, out.tex_coord, fb.width(), fb.height());
        }
        fill_triangle(fb, verts, |tex_coord| stage::shade_glyph(tex_coord, atlas, color));
    }
}

fn check_draw(view: ViewRect, empty: bool, what: &str) -> bool {
    if empty {
        return false;
    }
    if !view.is_valid() {
        log::warn!("skipping {what} draw: degenerate view {view:?}");
        return false;
    }
    true
}
