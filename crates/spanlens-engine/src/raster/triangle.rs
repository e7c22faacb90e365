use crate::coords::{ClipPos, ColorRgba, Vec2};

use super::Framebuffer;

/// Vertex after viewport mapping: framebuffer pixels plus its varying.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(super) struct ScreenVertex {
    pub pos: Vec2,
    pub tex_coord: Vec2,
}

impl ScreenVertex {
    /// Perspective divide, then NDC → pixels (NDC +Y up, pixels +Y down).
    pub fn from_clip(clip: ClipPos, tex_coord: Vec2, width: u32, height: u32) -> Self {
        let (nx, ny) = clip.ndc();
        Self {
            pos: Vec2::new(
                (nx + 1.0) * 0.5 * width as f32,
                (1.0 - ny) * 0.5 * height as f32,
            ),
            tex_coord,
        }
    }
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left rule for a positively wound triangle (pixel space, +Y down).
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y < 0.0 || (d.y == 0.0 && d.x > 0.0)
}

#[inline]
fn owns(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

/// Fills one triangle at pixel centers, shading each covered pixel with
/// `shade(interpolated tex_coord)` and blending it into `fb`.
///
/// Either winding is accepted. Degenerate or non-finite triangles are dropped.
pub(super) fn fill_triangle<F>(fb: &mut Framebuffer, verts: [ScreenVertex; 3], shade: F)
where
    F: Fn(Vec2) -> ColorRgba,
{
    let [v0, mut v1, mut v2] = verts;
    if !(v0.pos.is_finite() && v1.pos.is_finite() && v2.pos.is_finite()) {
        return;
    }

    let mut area = edge(v0.pos, v1.pos, v2.pos);
    if area == 0.0 {
        return;
    }
    if area < 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        area = -area;
    }

    let min_x = v0.pos.x.min(v1.pos.x).min(v2.pos.x).floor().max(0.0) as u32;
    let min_y = v0.pos.y.min(v1.pos.y).min(v2.pos.y).floor().max(0.0) as u32;
    let max_x = (v0.pos.x.max(v1.pos.x).max(v2.pos.x).ceil().max(0.0) as u32).min(fb.width());
    let max_y = (v0.pos.y.max(v1.pos.y).max(v2.pos.y).ceil().max(0.0) as u32).min(fb.height());

    let tl0 = is_top_left(v1.pos, v2.pos);
    let tl1 = is_top_left(v2.pos, v0.pos);
    let tl2 = is_top_left(v0.pos, v1.pos);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(v1.pos, v2.pos, p);
            let w1 = edge(v2.pos, v0.pos, p);
            let w2 = edge(v0.pos, v1.pos, p);
            if !(owns(w0, tl0) && owns(w1, tl1) && owns(w2, tl2)) {
                continue;
            }

            let (b0, b1, b2) = (w0 / area, w1 / area, w2 / area);
            let tex_coord = v0.tex_coord * b0 + v1.tex_coord * b1 + v2.tex_coord * b2;
            fb.blend(x, y, shade(tex_coord));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(x: f32, y: f32) -> ScreenVertex {
        ScreenVertex { pos: Vec2::new(x, y), tex_coord: Vec2::zero() }
    }

    fn count(fb: &Framebuffer) -> usize {
        fb.to_rgba8().chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    const RED: ColorRgba = ColorRgba::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn winding_does_not_matter() {
        let mut a = Framebuffer::new(4, 4).unwrap();
        let mut b = Framebuffer::new(4, 4).unwrap();
        fill_triangle(&mut a, [sv(0.0, 0.0), sv(4.0, 0.0), sv(0.0, 4.0)], |_| RED);
        fill_triangle(&mut b, [sv(0.0, 0.0), sv(0.0, 4.0), sv(4.0, 0.0)], |_| RED);
        assert_eq!(a, b);
        assert!(count(&a) > 0);
    }

    #[test]
    fn degenerate_triangle_is_dropped() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fill_triangle(&mut fb, [sv(0.0, 0.0), sv(2.0, 2.0), sv(4.0, 4.0)], |_| RED);
        assert_eq!(count(&fb), 0);
    }

    #[test]
    fn non_finite_triangle_is_dropped() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fill_triangle(&mut fb, [sv(f32::NAN, 0.0), sv(4.0, 0.0), sv(0.0, 4.0)], |_| RED);
        assert_eq!(count(&fb), 0);
    }

    #[test]
    fn adjacent_triangles_cover_square_exactly_once() {
        let mut fb = Framebuffer::new(3, 3).unwrap();
        let half = ColorRgba::new(1.0, 1.0, 1.0, 0.5);
        fill_triangle(&mut fb, [sv(0.0, 0.0), sv(0.0, 3.0), sv(3.0, 3.0)], |_| half);
        fill_triangle(&mut fb, [sv(0.0, 0.0), sv(3.0, 3.0), sv(3.0, 0.0)], |_| half);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(fb.pixel(x, y).unwrap().a, 0.5, "({x},{y})");
            }
        }
    }

    #[test]
    fn ndc_maps_to_pixel_space() {
        let v = ScreenVertex::from_clip(ClipPos::new(-1.0, 1.0, 0.0, 1.0), Vec2::zero(), 10, 20);
        assert_eq!(v.pos, Vec2::new(0.0, 0.0));
        let v = ScreenVertex::from_clip(ClipPos::new(1.0, -1.0, 0.0, 1.0), Vec2::zero(), 10, 20);
        assert_eq!(v.pos, Vec2::new(10.0, 20.0));
    }
}
