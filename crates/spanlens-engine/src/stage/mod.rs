//! Vertex and fragment stages of the box and glyph pipelines, as plain
//! functions.
//!
//! These are the CPU mirror of `render/shapes/shaders/{box,glyph}.wgsl` and
//! are what the software rasterizer runs per vertex and per fragment. Every
//! function is pure: no state, no error channel.

mod shade;
mod transform;

pub use shade::{box_fragment, glyph_fragment, shade_glyph};
pub use transform::{box_vertex, glyph_vertex, view_to_clip, GlyphVaryings};
