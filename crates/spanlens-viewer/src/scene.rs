//! Per-frame draw data: one box batch per span style plus a label batch.

use spanlens_engine::atlas::GridAtlas;
use spanlens_engine::coords::{ColorRgb, Rect, Vec2, ViewRect};
use spanlens_engine::geometry::{BoxGeometry, GeometryError, GlyphGeometry};

use crate::spans::{time_range, Span, SpanStyle};

/// Span box height in row units; rows are two units apart.
const BOX_HEIGHT: f32 = 1.5;
const ROW_PITCH: f32 = 2.0;

/// Gap between a box's left edge and its label, in target pixels.
const LABEL_INSET: f32 = 2.0;

pub const LABEL_COLOR: ColorRgb = ColorRgb::new(1.0, 0.5, 0.0);

pub struct Scene {
    /// Boxes in source space (seconds × row units).
    pub boxes: Vec<(ColorRgb, BoxGeometry)>,
    pub box_view: ViewRect,

    /// Labels in target pixels.
    pub labels: GlyphGeometry,
    pub label_view: ViewRect,
}

impl Scene {
    /// Builds draw data for `spans` (rows already assigned) on a
    /// `size`-pixel target. Labels are only produced when `atlas` is given.
    pub fn build(
        spans: &[Span],
        rows: u16,
        atlas: Option<&GridAtlas>,
        size: (u32, u32),
    ) -> Result<Self, GeometryError> {
        let box_view = match time_range(spans) {
            Some((start, end)) => {
                let start = start.as_secs_f32();
                let width = (end.as_secs_f32() - start).max(f32::EPSILON);
                ViewRect::new(start, 0.0, width, ROW_PITCH * f32::from(rows.max(1)))
            }
            None => ViewRect::from_size(1.0, ROW_PITCH),
        };

        let mut boxes = Vec::with_capacity(SpanStyle::DRAW_ORDER.len());
        for style in SpanStyle::DRAW_ORDER {
            let mut geometry = BoxGeometry::new();
            for span in spans.iter().filter(|s| s.style == style) {
                geometry.push_rect(span_rect(span))?;
            }
            if !geometry.is_empty() {
                boxes.push((style.color(), geometry));
            }
        }

        let label_view = ViewRect::from_size(size.0 as f32, size.1 as f32);
        let mut labels = GlyphGeometry::new();
        if let Some(atlas) = atlas {
            for span in spans {
                push_label(&mut labels, atlas, span, box_view, label_view)?;
            }
        }

        log::debug!(
            "scene: {} spans, {} box batches, {} label quads",
            spans.len(),
            boxes.len(),
            labels.quad_count()
        );

        Ok(Self {
            boxes,
            box_view,
            labels,
            label_view,
        })
    }
}

fn span_rect(span: &Span) -> Rect {
    let x1 = span.start.as_secs_f32();
    let x2 = span.end.as_secs_f32();
    let y1 = ROW_PITCH * f32::from(span.row);
    Rect::new(x1, y1, x2 - x1, BOX_HEIGHT)
}

/// Maps a source-space point into `target` pixels through `view`.
fn to_target(p: Vec2, view: ViewRect, target: ViewRect) -> Vec2 {
    (p - view.origin()).div_elem(view.size()).mul_elem(target.size()) + target.origin()
}

/// Label clipped to the characters that fit inside the span's box.
fn push_label(
    labels: &mut GlyphGeometry,
    atlas: &GridAtlas,
    span: &Span,
    box_view: ViewRect,
    label_view: ViewRect,
) -> Result<(), GeometryError> {
    let rect = span_rect(span);
    let min = to_target(rect.min(), box_view, label_view);
    let max = to_target(rect.max(), box_view, label_view);

    let (cell_w, cell_h) = atlas.cell_size();
    if (max.y - min.y) < cell_h as f32 {
        return Ok(());
    }
    let room = (max.x - min.x - 2.0 * LABEL_INSET).max(0.0);
    let fit = (room / cell_w as f32) as usize;
    if fit == 0 {
        return Ok(());
    }

    let text: String = span.name.chars().take(fit).collect();
    labels.push_str(atlas, &text, Vec2::new(min.x + LABEL_INSET, min.y))?;
    Ok(())
}
