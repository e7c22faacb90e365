use super::Vec2;

/// Axis-aligned rectangle in source pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::from_origin_size(min, max - min)
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_width() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn normalized_negative_height() {
        let n = r(0.0, 10.0, 5.0, -3.0).normalized();
        assert_eq!(n.origin.y, 7.0);
        assert_eq!(n.size.y, 3.0);
    }

    // ── min / max ─────────────────────────────────────────────────────────

    #[test]
    fn from_min_max_round_trips_corners() {
        let rect = Rect::from_min_max(Vec2::new(2.0, 3.0), Vec2::new(7.0, 11.0));
        assert_eq!(rect.min(), Vec2::new(2.0, 3.0));
        assert_eq!(rect.max(), Vec2::new(7.0, 11.0));
        assert_eq!(rect.size, Vec2::new(5.0, 8.0));
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
    }

    #[test]
    fn is_empty_positive_size() {
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
