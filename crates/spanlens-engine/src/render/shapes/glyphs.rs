use crate::atlas::CoverageImage;
use crate::coords::{ColorRgb, ViewRect};
use crate::geometry::{GlyphGeometry, GlyphVertex};
use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    alpha_blend, begin_load_pass, draw_ubo_layout_entry, index_bytes, should_draw,
    triangle_list, DrawSlots, DrawUniform, SlotLabels,
};

/// Glyph renderer.
///
/// Draws textured quads whose fragment alpha is the red channel of a
/// single-channel coverage atlas. The atlas is owned by the caller and
/// uploaded with [`GlyphRenderer::set_atlas`]; it stays read-only for every
/// draw until the next upload. Draws recorded into the same target keep
/// separate uniform, vertex and index buffers.
pub struct GlyphRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    sampler: Option<wgpu::Sampler>,
    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,
    atlas_size: (u32, u32),
    atlas_generation: u64,

    slots: DrawSlots,

    warned_no_atlas: bool,
}

impl Default for GlyphRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            atlas_texture: None,
            atlas_view: None,
            atlas_size: (0, 0),
            atlas_generation: 0,
            slots: DrawSlots::new(SlotLabels {
                ubo: "spanlens glyph draw ubo",
                vbo: "spanlens glyph vbo",
                ibo: "spanlens glyph ibo",
            }),
            warned_no_atlas: false,
        }
    }
}

impl GlyphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once an atlas has been uploaded.
    #[inline]
    pub fn has_atlas(&self) -> bool {
        self.atlas_view.is_some()
    }

    /// Uploads `image` as the R8Unorm atlas texture.
    ///
    /// The texture is reused when the size is unchanged.
    pub fn set_atlas(&mut self, ctx: &RenderCtx<'_>, image: &CoverageImage) {
        let size = (image.width(), image.height());
        if self.atlas_texture.is_none() || self.atlas_size != size {
            log::debug!("GlyphRenderer: creating {}x{} atlas texture", size.0, size.1);
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("spanlens glyph atlas"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.atlas_texture = Some(texture);
            self.atlas_size = size;
            self.atlas_generation += 1;
        }

        let Some(texture) = self.atlas_texture.as_ref() else { return };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.texels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.0),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Draws `geometry` into `target`, tinting atlas coverage with `color`.
    ///
    /// Skips the draw when geometry is empty, the view is degenerate, or no
    /// atlas has been uploaded yet.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        geometry: &GlyphGeometry,
        view: ViewRect,
        color: ColorRgb,
    ) {
        if !should_draw(view, geometry.is_empty(), "GlyphRenderer") {
            return;
        }
        if !self.has_atlas() {
            if !self.warned_no_atlas {
                log::warn!("GlyphRenderer: no atlas uploaded; glyph draws are skipped");
                self.warned_no_atlas = true;
            }
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_sampler(ctx);

        let Some(pipeline)   = self.pipeline.as_ref()          else { return; };
        let Some(bgl)        = self.bind_group_layout.as_ref() else { return; };
        let Some(atlas_view) = self.atlas_view.as_ref()        else { return; };
        let Some(sampler)    = self.sampler.as_ref()           else { return; };

        // The atlas generation invalidates bind groups made for an older texture.
        let slot = self.slots.next(ctx, target.frame);
        slot.ensure_bind_group(self.atlas_generation, |ubo| {
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("spanlens glyph bind group"),
                layout: bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(atlas_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        });

        ctx.queue
            .write_buffer(&slot.ubo, 0, bytemuck::bytes_of(&DrawUniform::new(view, color)));
        let vbo = slot.vbo.upload(ctx, bytemuck::cast_slice(&geometry.vertices));
        let ibo = slot.ibo.upload(ctx, &index_bytes(&geometry.indices));
        let Some(bind_group) = slot.bind_group.as_ref() else { return };

        let mut rpass = begin_load_pass(target.encoder, target.color_view, "spanlens glyph pass");
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
        log::debug!("GlyphRenderer: building pipeline for {:?}", ctx.surface_format);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spanlens glyph shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/glyph.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spanlens glyph bgl"),
            entries: &[
                draw_ubo_layout_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spanlens glyph pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("spanlens glyph pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[GlyphVertex::layout()],
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
        self.bind_group_layout = Some(bgl);
        self.slots.clear();
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("spanlens glyph sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Vertex layout (16 bytes):
///
///  offset 0  pos        [f32; 2]   loc 0
///  offset 8  tex_coord  [f32; 2]   loc 1
impl GlyphVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // tex_coord
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
