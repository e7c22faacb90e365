use std::sync::atomic::{AtomicU64, Ordering};

/// Renderer-facing context (device/queue + target format).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }
}

static NEXT_FRAME: AtomicU64 = AtomicU64::new(0);

/// Process-unique id for one encoder submission.
pub(crate) fn next_frame_id() -> u64 {
    NEXT_FRAME.fetch_add(1, Ordering::Relaxed)
}

/// Target for drawing (encoder + color view).
///
/// `frame` identifies the submission the encoder belongs to. Queue writes are
/// applied before any pass of that submission runs, so renderers key their
/// per-draw buffers on it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub frame: u64,
}

impl<'a> RenderTarget<'a> {
    /// Wraps an encoder that will be submitted once; each call starts a new frame.
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self {
            encoder,
            color_view,
            frame: next_frame_id(),
        }
    }
}
