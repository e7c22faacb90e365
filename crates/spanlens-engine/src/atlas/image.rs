use crate::coords::Vec2;

use super::AtlasError;

/// Anything the glyph fragment stage can sample coverage from.
pub trait CoverageSource {
    /// Coverage in `[0, 1]` at texture coordinate `uv`.
    fn sample(&self, uv: Vec2) -> f32;
}

/// Row-major 8-bit single-channel image.
///
/// Sampling is nearest-texel with clamp-to-edge addressing, matching the
/// sampler the glyph renderer binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageImage {
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

impl CoverageImage {
    /// Creates a zero-coverage image.
    pub fn new(width: u32, height: u32) -> Result<Self, AtlasError> {
        Self::from_raw(width, height, vec![0; width as usize * height as usize])
    }

    /// Wraps existing texels; `texels.len()` must equal `width * height`.
    pub fn from_raw(width: u32, height: u32, texels: Vec<u8>) -> Result<Self, AtlasError> {
        if width == 0 || height == 0 {
            return Err(AtlasError::ZeroSize);
        }
        if texels.len() != width as usize * height as usize {
            return Err(AtlasError::SizeMismatch { width, height, actual: texels.len() });
        }
        Ok(Self { width, height, texels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    /// Texel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.texels[(y * self.width + x) as usize])
    }

    /// Copies `src` (`w` × `h`, row-major) with its top-left at `(x, y)`.
    ///
    /// Texels falling outside the image are dropped.
    pub fn blit(&mut self, x: u32, y: u32, w: u32, h: u32, src: &[u8]) {
        for sy in 0..h {
            let dy = y + sy;
            if dy >= self.height {
                break;
            }
            for sx in 0..w {
                let dx = x + sx;
                if dx >= self.width {
                    break;
                }
                let Some(&v) = src.get((sy * w + sx) as usize) else { return };
                self.texels[(dy * self.width + dx) as usize] = v;
            }
        }
    }

    fn clamp_index(coord: f32, extent: u32) -> u32 {
        // NaN saturates to 0 through the float-to-int cast.
        let i = (coord * extent as f32).floor() as i64;
        i.clamp(0, extent as i64 - 1) as u32
    }
}

impl CoverageSource for CoverageImage {
    fn sample(&self, uv: Vec2) -> f32 {
        let x = Self::clamp_index(uv.x, self.width);
        let y = Self::clamp_index(uv.y, self.height);
        f32::from(self.texels[(y * self.width + x) as usize]) / 255.0
    }
}
