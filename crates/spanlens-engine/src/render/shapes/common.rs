//! Shared GPU types and utilities used by both shape renderers.

use bytemuck::{Pod, Zeroable};

use crate::coords::{ColorRgb, ViewRect};
use crate::render::RenderCtx;

// ── blend ─────────────────────────────────────────────────────────────────

/// Straight (non-premultiplied) source-over; fragment alpha is coverage.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::ALPHA_BLENDING
}

pub(super) fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

// ── draw uniform ──────────────────────────────────────────────────────────

/// `view` is `(x, y, width, height)`; `color.a` is padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub view: [f32; 4],
    pub color: [f32; 4],
}

impl DrawUniform {
    pub(super) fn new(view: ViewRect, color: ColorRgb) -> Self {
        Self {
            view: view.to_uniform(),
            color: color.to_uniform(),
        }
    }
}

/// Returns the `wgpu` minimum binding size for the draw uniform buffer.
pub(super) fn draw_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64)
        .expect("DrawUniform has non-zero size by construction")
}

pub(super) fn draw_ubo_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(draw_ubo_min_binding_size()),
        },
        count: None,
    }
}

pub(super) fn create_draw_ubo(ctx: &RenderCtx<'_>, label: &str) -> wgpu::Buffer {
    ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<DrawUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// ── growable buffers ──────────────────────────────────────────────────────

/// GPU buffer that is reallocated (power-of-two) when an upload outgrows it.
pub(super) struct GrowBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl GrowBuffer {
    pub(super) fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            buffer: None,
            capacity: 0,
        }
    }

    /// Uploads `bytes` (length must be a multiple of 4) and returns the buffer.
    pub(super) fn upload(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8]) -> &wgpu::Buffer {
        let required = bytes.len() as u64;
        let buffer = match self.buffer.take() {
            Some(buffer) if required <= self.capacity => buffer,
            _ => {
                let new_cap = required.next_power_of_two().max(256);
                log::debug!("{}: allocating {} bytes", self.label, new_cap);
                self.capacity = new_cap;
                ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(self.label),
                    size: new_cap,
                    usage: self.usage,
                    mapped_at_creation: false,
                })
            }
        };
        ctx.queue.write_buffer(&buffer, 0, bytes);
        self.buffer.insert(buffer)
    }
}

// ── per-draw slots ────────────────────────────────────────────────────────

/// Position of the next free slot within the current frame.
///
/// Every draw recorded into one submission gets its own slot; the cursor
/// rewinds when a draw arrives for a different frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct SlotCursor {
    frame: Option<u64>,
    used: usize,
}

impl SlotCursor {
    /// Claims the next slot index for `frame`.
    pub(super) fn claim(&mut self, frame: u64) -> usize {
        if self.frame != Some(frame) {
            self.frame = Some(frame);
            self.used = 0;
        }
        let index = self.used;
        self.used += 1;
        index
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Uniform, vertex and index storage owned by one draw of a frame.
pub(super) struct DrawSlot {
    pub ubo: wgpu::Buffer,
    pub vbo: GrowBuffer,
    pub ibo: GrowBuffer,
    pub bind_group: Option<wgpu::BindGroup>,
    bind_generation: u64,
}

impl DrawSlot {
    fn new(ctx: &RenderCtx<'_>, labels: &SlotLabels) -> Self {
        Self {
            ubo: create_draw_ubo(ctx, labels.ubo),
            vbo: GrowBuffer::new(labels.vbo, wgpu::BufferUsages::VERTEX),
            ibo: GrowBuffer::new(labels.ibo, wgpu::BufferUsages::INDEX),
            bind_group: None,
            bind_generation: 0,
        }
    }

    /// Rebuilds the bind group when `generation` changed since it was made.
    pub(super) fn ensure_bind_group<F>(&mut self, generation: u64, create: F)
    where
        F: FnOnce(&wgpu::Buffer) -> wgpu::BindGroup,
    {
        if self.bind_group.is_some() && self.bind_generation == generation {
            return;
        }
        self.bind_group = Some(create(&self.ubo));
        self.bind_generation = generation;
    }
}

pub(super) struct SlotLabels {
    pub ubo: &'static str,
    pub vbo: &'static str,
    pub ibo: &'static str,
}

/// Pool of [`DrawSlot`]s, grown to the largest number of draws seen in a frame.
pub(super) struct DrawSlots {
    labels: SlotLabels,
    slots: Vec<DrawSlot>,
    cursor: SlotCursor,
}

impl DrawSlots {
    pub(super) fn new(labels: SlotLabels) -> Self {
        Self {
            labels,
            slots: Vec::new(),
            cursor: SlotCursor::default(),
        }
    }

    /// Slot for the next draw recorded into `frame`.
    pub(super) fn next(&mut self, ctx: &RenderCtx<'_>, frame: u64) -> &mut DrawSlot {
        let index = self.cursor.claim(frame);
        if index == self.slots.len() {
            log::debug!("{}: growing to {} draw slots", self.labels.ubo, index + 1);
            self.slots.push(DrawSlot::new(ctx, &self.labels));
        }
        &mut self.slots[index]
    }

    /// Drops every slot; bind groups made for an old layout are unusable.
    pub(super) fn clear(&mut self) {
        self.slots.clear();
        self.cursor.reset();
    }
}

/// `u16` index data padded to the 4-byte copy alignment.
pub(super) fn index_bytes(indices: &[u16]) -> std::borrow::Cow<'_, [u8]> {
    let bytes: &[u8] = bytemuck::cast_slice(indices);
    if bytes.len() % 4 == 0 {
        std::borrow::Cow::Borrowed(bytes)
    } else {
        let mut padded = bytes.to_vec();
        padded.extend_from_slice(&[0, 0]);
        std::borrow::Cow::Owned(padded)
    }
}

// ── pass ──────────────────────────────────────────────────────────────────

/// Render pass that keeps existing target contents.
pub(super) fn begin_load_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Shared draw precondition: non-empty geometry and a usable view.
pub(super) fn should_draw(view: ViewRect, empty: bool, what: &str) -> bool {
    if empty {
        return false;
    }
    if !view.is_valid() {
        log::warn!("{what}: skipping draw with degenerate view {view:?}");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniform_is_two_vec4() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 32);
        let u = DrawUniform::new(ViewRect::new(1.0, 2.0, 3.0, 4.0), ColorRgb::new(0.1, 0.2, 0.3));
        assert_eq!(u.view, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(&u.color[..3], &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn index_bytes_pad_to_four() {
        assert_eq!(index_bytes(&[1, 2]).len(), 4);
        assert_eq!(index_bytes(&[1, 2, 3]).len(), 8);
        assert_eq!(index_bytes(&[0, 1, 2, 0, 2, 3]).len(), 12);
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn draws_in_one_frame_claim_distinct_slots() {
        let mut cursor = SlotCursor::default();
        assert_eq!(cursor.claim(7), 0);
        assert_eq!(cursor.claim(7), 1);
        assert_eq!(cursor.claim(7), 2);
    }

    #[test]
    fn new_frame_rewinds_the_cursor() {
        let mut cursor = SlotCursor::default();
        cursor.claim(1);
        cursor.claim(1);
        assert_eq!(cursor.claim(2), 0);
        assert_eq!(cursor.claim(2), 1);

        cursor.reset();
        assert_eq!(cursor.claim(2), 0);
    }

    #[test]
    fn degenerate_view_is_not_drawn() {
        assert!(!should_draw(ViewRect::new(0.0, 0.0, 10.0, 0.0), false, "test"));
        assert!(!should_draw(ViewRect::from_size(10.0, 10.0), true, "test"));
        assert!(should_draw(ViewRect::from_size(10.0, 10.0), false, "test"));
    }
}
