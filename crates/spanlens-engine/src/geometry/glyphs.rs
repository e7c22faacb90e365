use bytemuck::{Pod, Zeroable};

use crate::atlas::{GridAtlas, UvRect};
use crate::coords::{Rect, Vec2};

use super::{next_base, quad_corners, quad_indices, rect_corners, GeometryError};

/// Glyph-pipeline vertex: pixel-space corner plus atlas texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    pub pos: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Vertex/index data for one glyph-pipeline draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphGeometry {
    pub vertices: Vec<GlyphVertex>,
    pub indices: Vec<u16>,
}

impl GlyphGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends a textured quad covering `dst`, sampling `uv`.
    pub fn push_quad(&mut self, dst: Rect, uv: UvRect) -> Result<(), GeometryError> {
        let base = next_base(self.vertices.len())?;
        let pos = rect_corners(dst);
        let tex = quad_corners(uv.min.to_array(), uv.max.to_array());
        self.vertices.extend(
            pos.iter()
                .zip(tex.iter())
                .map(|(&pos, &tex_coord)| GlyphVertex { pos, tex_coord }),
        );
        self.indices.extend_from_slice(&quad_indices(base));
        Ok(())
    }

    /// Appends the cell for `code` with its top-left at `origin`.
    ///
    /// Returns `Ok(false)` when the atlas has no glyph for `code`.
    pub fn push_char(
        &mut self,
        atlas: &GridAtlas,
        code: u32,
        origin: Vec2,
    ) -> Result<bool, GeometryError> {
        let Some(uv) = atlas.cell_uv(code) else { return Ok(false) };
        let (w, h) = atlas.cell_size();
        self.push_quad(Rect::new(origin.x, origin.y, w as f32, h as f32), uv)?;
        Ok(true)
    }

    /// Appends a single-line run, advancing one cell width per character.
    ///
    /// Characters without a glyph still advance. Returns the pen position
    /// after the last character.
    pub fn push_str(
        &mut self,
        atlas: &GridAtlas,
        text: &str,
        origin: Vec2,
    ) -> Result<Vec2, GeometryError> {
        let advance = atlas.cell_size().0 as f32;
        let mut pen = origin;
        for ch in text.chars() {
            self.push_char(atlas, ch as u32, pen)?;
            pen.x += advance;
        }
        Ok(pen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{GlyphBitmap, GridAtlasConfig};

    fn atlas() -> GridAtlas {
        let glyph = |w: u32, h: u32| GlyphBitmap {
            width: w,
            height: h,
            left: 0,
            top: 0,
            data: vec![255; (w * h) as usize],
        };
        GridAtlas::from_bitmaps(
            GridAtlasConfig::default(),
            [(u32::from(b'a'), glyph(6, 10)), (u32::from(b'b'), glyph(8, 12)), (32, glyph(0, 0))],
        )
        .unwrap()
    }

    #[test]
    fn push_quad_pairs_positions_with_tex_coords() {
        let mut g = GlyphGeometry::new();
        let uv = UvRect::new(Vec2::new(0.25, 0.5), Vec2::new(0.5, 0.75));
        g.push_quad(Rect::new(10.0, 20.0, 8.0, 12.0), uv).unwrap();

        let expected = [
            ([10.0, 20.0], [0.25, 0.5]),
            ([10.0, 32.0], [0.25, 0.75]),
            ([18.0, 32.0], [0.5, 0.75]),
            ([18.0, 20.0], [0.5, 0.5]),
        ];
        for (v, (pos, tex)) in g.vertices.iter().zip(expected) {
            assert_eq!(v.pos, pos);
            assert_eq!(v.tex_coord, tex);
        }
        assert_eq!(g.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn push_char_uses_cell_size_and_uv() {
        let atlas = atlas();
        let mut g = GlyphGeometry::new();
        assert!(g.push_char(&atlas, u32::from(b'a'), Vec2::new(0.0, 0.0)).unwrap());
        assert_eq!(g.vertices[2].pos, [8.0, 12.0]);
        let uv = atlas.cell_uv(u32::from(b'a')).unwrap();
        assert_eq!(g.vertices[0].tex_coord, uv.min.to_array());
        assert_eq!(g.vertices[2].tex_coord, uv.max.to_array());
    }

    #[test]
    fn push_char_skips_missing_glyph() {
        let mut g = GlyphGeometry::new();
        assert!(!g.push_char(&atlas(), u32::from(b'z'), Vec2::zero()).unwrap());
        assert!(g.is_empty());
    }

    #[test]
    fn push_str_advances_one_cell_per_char() {
        let mut g = GlyphGeometry::new();
        let pen = g.push_str(&atlas(), "a zb", Vec2::new(100.0, 5.0)).unwrap();
        // 'z' has no glyph: three quads, four advances.
        assert_eq!(g.quad_count(), 3);
        assert_eq!(pen, Vec2::new(100.0 + 4.0 * 8.0, 5.0));
        assert_eq!(g.vertices[8].pos, [100.0 + 3.0 * 8.0, 5.0]);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<GlyphVertex>(), 16);
    }
}
