use winit::window::Window;

use crate::coords::ColorRgba;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    ///
    /// Surface errors skip the frame; an out-of-memory error returns `Exit`.
    pub fn render<F>(&mut self, clear: ColorRgba, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::warn!("failed to acquire frame: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    SurfaceErrorAction::Reconfigured => {
                        self.window.request_redraw();
                        AppControl::Continue
                    }
                    SurfaceErrorAction::SkipFrame => AppControl::Continue,
                };
            }
        };

        // Clear pass; dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spanlens clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
        }

        let rctx = self.gpu.render_ctx();

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
