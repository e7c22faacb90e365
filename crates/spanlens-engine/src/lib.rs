//! spanlens engine crate.
//!
//! Two small rasterization pipelines for trace-span visualisation:
//! flat-colored boxes and glyph quads sampled from a single-channel coverage
//! atlas. Both map source pixel space through a per-draw view rectangle into
//! clip space.
//!
//! The pipelines run on the GPU (`render`, WGSL) or on the CPU (`raster`),
//! sharing the stage math in `stage`.

pub mod coords;
pub mod stage;

pub mod atlas;
pub mod geometry;
pub mod raster;

pub mod device;
pub mod render;

pub mod core;
pub mod window;

pub mod logging;
