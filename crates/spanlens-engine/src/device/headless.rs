use std::sync::mpsc;

use anyhow::{Context, Result};

use super::adapter::{create_instance, request_device};
use super::GpuInit;
use crate::coords::ColorRgba;
use crate::render::{RenderCtx, RenderTarget};

/// Device/queue with an offscreen color target instead of a window surface.
///
/// Used for tests and image export. The target is `Rgba8Unorm` (no sRGB
/// encoding), so read-back bytes match the blended fragment values.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl HeadlessGpu {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Acquires an adapter without a surface and allocates a `width`×`height` target.
    pub async fn new(width: u32, height: u32, init: &GpuInit) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "offscreen target has zero size");

        let instance = create_instance();
        let (_adapter, device, queue) = request_device(&instance, None, init).await?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("spanlens offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("offscreen target {width}x{height} created");

        Ok(Self {
            device,
            queue,
            target,
            target_view,
            width,
            height,
        })
    }

    /// Blocking variant of [`HeadlessGpu::new`].
    pub fn new_blocking(width: u32, height: u32, init: &GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(width, height, init))
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, Self::FORMAT)
    }

    /// Clears the target to `clear`, records `draw`, and submits.
    pub fn render<F>(&self, clear: ColorRgba, draw: F)
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spanlens offscreen encoder"),
            });

        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spanlens offscreen clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
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
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let ctx = self.render_ctx();
        let mut target = RenderTarget::new(&mut encoder, &self.target_view);
        draw(&ctx, &mut target);

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copies the target back to the CPU as tightly packed RGBA8 rows.
    pub fn read_rgba8(&self) -> Result<Vec<u8>> {
        let row_bytes = self.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = row_bytes.div_ceil(align) * align;

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spanlens readback"),
            size: padded_row_bytes as u64 * self.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spanlens readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during readback")?;
        rx.recv()
            .context("readback map callback was dropped")?
            .context("failed to map readback buffer")?;

        let mapped = slice.get_mapped_range();
        let mut out = Vec::with_capacity((row_bytes * self.height) as usize);
        for row in mapped.chunks_exact(padded_row_bytes as usize) {
            out.extend_from_slice(&row[..row_bytes as usize]);
        }
        drop(mapped);
        readback.unmap();
        Ok(out)
    }
}
