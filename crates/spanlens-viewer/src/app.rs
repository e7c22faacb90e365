//! On-screen viewer driven by the engine runtime.

use spanlens_engine::atlas::GridAtlas;
use spanlens_engine::coords::ColorRgba;
use spanlens_engine::core::{App, AppControl, FrameCtx};
use spanlens_engine::render::shapes::{BoxRenderer, GlyphRenderer};

use crate::scene::{Scene, LABEL_COLOR};
use crate::spans::Span;

const CLEAR: ColorRgba = ColorRgba::new(0.0, 0.0, 0.0, 1.0);

pub struct ViewerApp {
    spans: Vec<Span>,
    rows: u16,
    atlas: Option<GridAtlas>,
    atlas_uploaded: bool,

    boxes: BoxRenderer,
    glyphs: GlyphRenderer,
}

impl ViewerApp {
    pub fn new(spans: Vec<Span>, rows: u16, atlas: Option<GridAtlas>) -> Self {
        Self {
            spans,
            rows,
            atlas,
            atlas_uploaded: false,
            boxes: BoxRenderer::new(),
            glyphs: GlyphRenderer::new(),
        }
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let scene = match Scene::build(&self.spans, self.rows, self.atlas.as_ref(), ctx.size()) {
            Ok(scene) => scene,
            Err(err) => {
                log::error!("failed to build scene: {err}");
                return AppControl::Exit;
            }
        };

        let Self { atlas, atlas_uploaded, boxes, glyphs, .. } = self;

        ctx.render(CLEAR, |rctx, target| {
            for (color, geometry) in &scene.boxes {
                boxes.render(rctx, target, geometry, scene.box_view, *color);
            }

            let Some(atlas) = atlas.as_ref() else { return };
            if !*atlas_uploaded {
                glyphs.set_atlas(rctx, atlas.image());
                *atlas_uploaded = true;
            }
            glyphs.render(rctx, target, &scene.labels, scene.label_view, LABEL_COLOR);
        })
    }
}
