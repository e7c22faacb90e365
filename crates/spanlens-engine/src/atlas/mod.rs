//! Single-channel coverage atlases.
//!
//! The glyph fragment stage reads the red channel of an atlas as coverage.
//! [`CoverageImage`] is the CPU-side texel store (also the upload source for
//! the GPU texture); [`GridAtlas`] lays ASCII glyphs out on a fixed grid.

mod error;
mod grid;
mod image;

pub use error::AtlasError;
pub use grid::{GlyphBitmap, GridAtlas, GridAtlasConfig, UvRect};
pub use image::{CoverageImage, CoverageSource};
