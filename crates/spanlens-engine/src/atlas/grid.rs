use crate::coords::Vec2;

use super::{AtlasError, CoverageImage};

/// Grid layout of a [`GridAtlas`].
///
/// Code `c` lives in column `c % columns`, row `c / columns`, so the grid
/// must be large enough to address `last_code`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridAtlasConfig {
    pub columns: u32,
    pub rows: u32,
    pub first_code: u32,
    pub last_code: u32,
}

impl Default for GridAtlasConfig {
    /// Printable ASCII on a 16 × 8 grid.
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 8,
            first_code: 32,
            last_code: 126,
        }
    }
}

impl GridAtlasConfig {
    /// Number of cells, or `None` if the grid does not fit in `u32`.
    #[inline]
    fn capacity(&self) -> Option<u32> {
        self.columns.checked_mul(self.rows)
    }

    #[inline]
    fn contains(&self, code: u32) -> bool {
        code >= self.first_code
            && code <= self.last_code
            && self.capacity().is_some_and(|cells| code < cells)
    }

    /// Texel size of the whole grid for the given cell size.
    fn image_size(&self, cell_width: u32, cell_height: u32) -> Result<(u32, u32), AtlasError> {
        let too_large = AtlasError::GridTooLarge {
            columns: self.columns,
            rows: self.rows,
            cell_width,
            cell_height,
        };
        self.capacity().ok_or_else(|| too_large.clone())?;
        match (
            self.columns.checked_mul(cell_width),
            self.rows.checked_mul(cell_height),
        ) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(too_large),
        }
    }
}

/// Rasterized coverage for a single glyph.
///
/// `left` / `top` offset the bitmap from its cell's top-left corner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub left: u32,
    pub top: u32,
    pub data: Vec<u8>,
}

/// Texture-space rectangle, `[0, 1]^2`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvRect {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The whole texture.
    #[inline]
    pub const fn full() -> Self {
        Self::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0))
    }
}

/// Fixed-cell glyph atlas.
///
/// Every cell has the size of the largest glyph extent; there is no packing.
/// Supplied codes get a cell even when their bitmap is empty (e.g. space), so
/// text runs can advance over them.
#[derive(Debug, Clone)]
pub struct GridAtlas {
    config: GridAtlasConfig,
    cell_width: u32,
    cell_height: u32,
    present: Vec<bool>,
    image: CoverageImage,
}

impl GridAtlas {
    /// Builds an atlas from pre-rasterized glyphs.
    pub fn from_bitmaps<I>(config: GridAtlasConfig, glyphs: I) -> Result<Self, AtlasError>
    where
        I: IntoIterator<Item = (u32, GlyphBitmap)>,
    {
        let mut glyphs: Vec<(u32, GlyphBitmap)> = glyphs.into_iter().collect();
        if glyphs.is_empty() {
            return Err(AtlasError::Empty);
        }
        if let Some(&(code, _)) = glyphs.iter().find(|(code, _)| !config.contains(*code)) {
            return Err(AtlasError::CodeOutOfRange(code));
        }
        glyphs.sort_by_key(|(code, _)| *code);

        let cell_width = glyphs.iter().map(|(_, g)| g.left + g.width).max().unwrap_or(0);
        let cell_height = glyphs.iter().map(|(_, g)| g.top + g.height).max().unwrap_or(0);
        if cell_width == 0 || cell_height == 0 {
            return Err(AtlasError::Empty);
        }

        let (image_width, image_height) = config.image_size(cell_width, cell_height)?;
        let mut image = CoverageImage::new(image_width, image_height)?;
        let mut present = vec![false; config.capacity().unwrap_or(0) as usize];

        for (code, glyph) in &glyphs {
            let col = code % config.columns;
            let row = code / config.columns;
            image.blit(
                col * cell_width + glyph.left,
                row * cell_height + glyph.top,
                glyph.width,
                glyph.height,
                &glyph.data,
            );
            present[*code as usize] = true;
        }

        log::debug!(
            "grid atlas built: {} glyphs, cell {}x{}, image {}x{}",
            glyphs.len(),
            cell_width,
            cell_height,
            image.width(),
            image.height()
        );

        Ok(Self { config, cell_width, cell_height, present, image })
    }

    /// Rasterizes `first_code..=last_code` from a TrueType/OpenType font at
    /// `px` pixels per em.
    ///
    /// Glyphs share a common baseline inside their cells.
    pub fn from_font(bytes: &[u8], px: f32, config: GridAtlasConfig) -> Result<Self, AtlasError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| AtlasError::FontLoad(e.to_string()))?;

        let rasterized: Vec<(u32, fontdue::Metrics, Vec<u8>)> = (config.first_code
            ..=config.last_code)
            .filter(|code| config.contains(*code))
            .filter_map(|code| char::from_u32(code).map(|ch| (code, ch)))
            .map(|(code, ch)| {
                let (metrics, bitmap) = font.rasterize(ch, px);
                (code, metrics, bitmap)
            })
            .collect();

        // Height of the tallest ink above the baseline.
        let baseline = rasterized
            .iter()
            .map(|(_, m, _)| m.height as i32 + m.ymin)
            .max()
            .unwrap_or(0);

        let glyphs = rasterized.into_iter().map(|(code, m, data)| {
            let top = (baseline - (m.height as i32 + m.ymin)).max(0) as u32;
            (
                code,
                GlyphBitmap {
                    width: m.width as u32,
                    height: m.height as u32,
                    left: m.xmin.max(0) as u32,
                    top,
                    data,
                },
            )
        });

        Self::from_bitmaps(config, glyphs)
    }

    #[inline]
    pub fn config(&self) -> GridAtlasConfig {
        self.config
    }

    /// Size of one cell in texels; also the on-screen size of a glyph quad.
    #[inline]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    #[inline]
    pub fn image(&self) -> &CoverageImage {
        &self.image
    }

    /// Texture rectangle of `code`'s cell, or `None` if the code has no glyph.
    pub fn cell_uv(&self, code: u32) -> Option<UvRect> {
        if !self.config.contains(code) || !self.present[code as usize] {
            return None;
        }
        let cols = self.config.columns as f32;
        let rows = self.config.rows as f32;
        let x = (code % self.config.columns) as f32;
        let y = (code / self.config.columns) as f32;
        Some(UvRect::new(
            Vec2::new(x / cols, y / rows),
            Vec2::new((x + 1.0) / cols, (y + 1.0) / rows),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::CoverageSource;

    fn solid(width: u32, height: u32, value: u8) -> GlyphBitmap {
        GlyphBitmap {
            width,
            height,
            left: 0,
            top: 0,
            data: vec![value; (width * height) as usize],
        }
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn cell_size_is_max_glyph_extent() {
        let atlas = GridAtlas::from_bitmaps(
            GridAtlasConfig::default(),
            [(65, solid(3, 5, 255)), (66, solid(4, 2, 255))],
        )
        .unwrap();
        assert_eq!(atlas.cell_size(), (4, 5));
        assert_eq!(atlas.image().width(), 16 * 4);
        assert_eq!(atlas.image().height(), 8 * 5);
    }

    #[test]
    fn offsets_grow_the_cell() {
        let mut g = solid(2, 2, 255);
        g.left = 1;
        g.top = 3;
        let atlas = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(33, g)]).unwrap();
        assert_eq!(atlas.cell_size(), (3, 5));
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: [(u32, GlyphBitmap); 0] = [];
        assert_eq!(
            GridAtlas::from_bitmaps(GridAtlasConfig::default(), none).unwrap_err(),
            AtlasError::Empty
        );
    }

    #[test]
    fn all_blank_glyphs_are_rejected() {
        let err = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(32, solid(0, 0, 0))])
            .unwrap_err();
        assert_eq!(err, AtlasError::Empty);
    }

    #[test]
    fn code_outside_range_is_rejected() {
        let err = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(200, solid(1, 1, 1))])
            .unwrap_err();
        assert_eq!(err, AtlasError::CodeOutOfRange(200));

        let err = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(10, solid(1, 1, 1))])
            .unwrap_err();
        assert_eq!(err, AtlasError::CodeOutOfRange(10));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let config = GridAtlasConfig {
            columns: u32::MAX,
            rows: 2,
            first_code: 32,
            last_code: 126,
        };
        assert!(!config.contains(65));
        let err = GridAtlas::from_bitmaps(config, [(65, solid(1, 1, 255))]).unwrap_err();
        assert_eq!(err, AtlasError::CodeOutOfRange(65));

        // Cell count fits, texel width does not.
        let config = GridAtlasConfig {
            columns: 1 << 20,
            rows: 1,
            first_code: 0,
            last_code: 126,
        };
        let err = GridAtlas::from_bitmaps(config, [(65, solid(1 << 13, 1, 255))]).unwrap_err();
        assert!(matches!(err, AtlasError::GridTooLarge { .. }), "{err:?}");
    }

    #[test]
    fn invalid_font_bytes_report_font_load() {
        let err = GridAtlas::from_font(b"not a font", 16.0, GridAtlasConfig::default())
            .unwrap_err();
        assert!(matches!(err, AtlasError::FontLoad(_)), "{err:?}");
    }

    // ── addressing ────────────────────────────────────────────────────────

    #[test]
    fn cell_uv_follows_grid_position() {
        let atlas = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(b'a' as u32, solid(2, 2, 255))])
            .unwrap();
        // 'a' = 97 → column 1, row 6.
        let uv = atlas.cell_uv(97).unwrap();
        assert_eq!(uv.min, Vec2::new(1.0 / 16.0, 6.0 / 8.0));
        assert_eq!(uv.max, Vec2::new(2.0 / 16.0, 7.0 / 8.0));
    }

    #[test]
    fn missing_code_has_no_uv() {
        let atlas = GridAtlas::from_bitmaps(GridAtlasConfig::default(), [(65, solid(1, 1, 255))])
            .unwrap();
        assert!(atlas.cell_uv(66).is_none());
        assert!(atlas.cell_uv(1000).is_none());
    }

    #[test]
    fn glyph_texels_land_in_their_cell() {
        let atlas = GridAtlas::from_bitmaps(
            GridAtlasConfig::default(),
            [(65, solid(2, 2, 255)), (32, solid(0, 0, 0))],
        )
        .unwrap();
        // 65 → column 1, row 4; cell 2x2.
        assert_eq!(atlas.image().texel(2, 8), Some(255));
        assert_eq!(atlas.image().texel(3, 9), Some(255));
        assert_eq!(atlas.image().texel(0, 8), Some(0));

        let uv = atlas.cell_uv(65).unwrap();
        let center = (uv.min + uv.max) * 0.5;
        assert_eq!(atlas.image().sample(center), 1.0);

        // Space gets a (blank) cell.
        let space = atlas.cell_uv(32).unwrap();
        assert_eq!(atlas.image().sample((space.min + space.max) * 0.5), 0.0);
    }
}
