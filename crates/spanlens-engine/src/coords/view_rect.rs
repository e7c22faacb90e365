use super::{Rect, Vec2};

/// Visible window of source pixel space: `(x, y, width, height)`.
///
/// Supplied per draw call and uploaded as the `view` uniform. Vertex stages
/// map `(x, y)` to clip `(-1, 1)` and `(x + width, y + height)` to `(1, -1)`.
///
/// A zero or non-finite extent is a caller error; the stages do not check it.
/// Use [`ViewRect::is_valid`] at the call site.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// View anchored at the origin, e.g. a framebuffer in pixels.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// View spanning `min..max` on both axes.
    #[inline]
    pub fn from_bounds(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn as_rect(self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width != 0.0
            && self.height != 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Layout of the `view: vec4<f32>` uniform.
    #[inline]
    pub const fn to_uniform(self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bounds_computes_extent() {
        let v = ViewRect::from_bounds(Vec2::new(10.0, 20.0), Vec2::new(40.0, 25.0));
        assert_eq!(v, ViewRect::new(10.0, 20.0, 30.0, 5.0));
        assert_eq!(v.max(), Vec2::new(40.0, 25.0));
    }

    #[test]
    fn zero_extent_is_invalid() {
        assert!(!ViewRect::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!ViewRect::new(0.0, 0.0, 10.0, 0.0).is_valid());
        assert!(ViewRect::from_size(1.0, 1.0).is_valid());
    }

    #[test]
    fn non_finite_is_invalid() {
        assert!(!ViewRect::new(f32::NAN, 0.0, 1.0, 1.0).is_valid());
        assert!(!ViewRect::new(0.0, 0.0, f32::INFINITY, 1.0).is_valid());
    }

    #[test]
    fn uniform_layout_is_xywh() {
        assert_eq!(ViewRect::new(1.0, 2.0, 3.0, 4.0).to_uniform(), [1.0, 2.0, 3.0, 4.0]);
    }
}
