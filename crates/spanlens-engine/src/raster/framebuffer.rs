use crate::coords::{ColorRgba, ViewRect};

use super::RasterError;

/// Straight-alpha RGBA color buffer, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<ColorRgba>,
}

impl Framebuffer {
    /// Creates a transparent framebuffer.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![ColorRgba::transparent(); width as usize * height as usize],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// View rectangle mapping source pixels 1:1 onto this framebuffer.
    #[inline]
    pub fn view(&self) -> ViewRect {
        ViewRect::from_size(self.width as f32, self.height as f32)
    }

    pub fn clear(&mut self, color: ColorRgba) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorRgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Composites `src` over the pixel at `(x, y)`; out-of-bounds is ignored.
    #[inline]
    pub fn blend(&mut self, x: u32, y: u32, src: ColorRgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.pixels[i] = src.over(self.pixels[i]);
    }

    /// Packed 8-bit RGBA, row-major (suitable for PNG encoding).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba8()).collect()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
