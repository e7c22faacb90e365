//! GPU rendering subsystem.
//!
//! Renderers consume per-draw geometry and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - CPU geometry is in source pixels (top-left origin, +Y down).
//! - Vertex shaders map the per-draw view rectangle onto clip space.

mod ctx;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
