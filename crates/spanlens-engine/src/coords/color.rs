/// RGB color, uniform per draw call.
///
/// Channels are expected in `[0, 1]`. No color-space conversion happens on
/// the CPU side; sRGB handling is left to the render target format.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> ColorRgba {
        ColorRgba::new(self.r, self.g, self.b, a)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Layout of the `color: vec4<f32>` uniform (alpha lane is padding).
    #[inline]
    pub const fn to_uniform(self) -> [f32; 4] {
        [self.r, self.g, self.b, 0.0]
    }
}

/// Straight (non-premultiplied) RGBA color, as written by fragment stages.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn rgb(self) -> ColorRgb {
        ColorRgb::new(self.r, self.g, self.b)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Source-over composite of `self` onto `dst` (straight alpha).
    #[inline]
    pub fn over(self, dst: ColorRgba) -> ColorRgba {
        let a = self.a.clamp(0.0, 1.0);
        let inv = 1.0 - a;
        ColorRgba::new(
            self.r * a + dst.r * inv,
            self.g * a + dst.g * inv,
            self.b * a + dst.b * inv,
            a + dst.a * inv,
        )
    }

    /// Quantizes to 8-bit channels, clamping to `[0, 1]` first.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opaque_replaces_destination() {
        let src = ColorRgba::new(1.0, 0.5, 0.0, 1.0);
        let dst = ColorRgba::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(src.over(dst), src);
    }

    #[test]
    fn over_transparent_keeps_destination() {
        let src = ColorRgba::new(1.0, 1.0, 1.0, 0.0);
        let dst = ColorRgba::new(0.2, 0.4, 0.6, 1.0);
        assert_eq!(src.over(dst), dst);
    }

    #[test]
    fn over_half_coverage_mixes() {
        let src = ColorRgba::new(1.0, 1.0, 1.0, 0.5);
        let out = src.over(ColorRgba::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out, ColorRgba::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn to_rgba8_clamps_and_rounds() {
        assert_eq!(ColorRgba::new(1.5, -0.2, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn uniform_pads_alpha_lane() {
        assert_eq!(ColorRgb::new(0.1, 0.2, 0.3).to_uniform(), [0.1, 0.2, 0.3, 0.0]);
    }
}
