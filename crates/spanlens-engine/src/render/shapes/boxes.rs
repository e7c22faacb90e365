use crate::coords::{ColorRgb, ViewRect};
use crate::geometry::BoxGeometry;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    alpha_blend, begin_load_pass, draw_ubo_layout_entry, index_bytes, should_draw,
    triangle_list, DrawSlots, DrawUniform, SlotLabels,
};

/// Flat-colored box renderer.
///
/// Positions are in source pixels and mapped through `view` in the vertex
/// shader; every fragment is the uniform color at full opacity. Any number
/// of draws may be recorded into one target; each keeps its own buffers.
pub struct BoxRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    slots: DrawSlots,
}

impl Default for BoxRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            slots: DrawSlots::new(SlotLabels {
                ubo: "spanlens box draw ubo",
                vbo: "spanlens box vbo",
                ibo: "spanlens box ibo",
            }),
        }
    }
}

impl BoxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `geometry` into `target`, blending over its contents.
    ///
    /// Empty geometry is a no-op; a degenerate `view` skips the draw with a warning.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        geometry: &BoxGeometry,
        view: ViewRect,
        color: ColorRgb,
    ) {
        if !should_draw(view, geometry.is_empty(), "BoxRenderer") {
            return;
        }

        self.ensure_pipeline(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let slot = self.slots.next(ctx, target.frame);
        slot.ensure_bind_group(0, |ubo| {
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("spanlens box bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            })
        });

        ctx.queue
            .write_buffer(&slot.ubo, 0, bytemuck::bytes_of(&DrawUniform::new(view, color)));
        let vbo = slot.vbo.upload(ctx, bytemuck::cast_slice(&geometry.positions));
        let ibo = slot.ibo.upload(ctx, &index_bytes(&geometry.indices));
        let Some(bind_group) = slot.bind_group.as_ref() else { return };

        let mut rpass = begin_load_pass(target.encoder, target.color_view, "spanlens box pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..geometry.indices.len() as u32, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        log::debug!("BoxRenderer: building pipeline for {:?}", ctx.surface_format);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spanlens box shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/box.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("spanlens box bgl"),
                    entries: &[draw_ubo_layout_entry(0)],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("spanlens box pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("spanlens box pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &ATTRS,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.slots.clear();
    }
}
