/// Homogeneous clip-space position produced by a vertex stage.
///
/// Both vertex stages emit `z = 0` and `w = 1`, so the perspective divide is
/// the identity for everything this crate draws.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl ClipPos {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Normalized device coordinates (`xy / w`).
    #[inline]
    pub fn ndc(self) -> (f32, f32) {
        (self.x / self.w, self.y / self.w)
    }

    /// Returns true when the position lies inside the `[-1, 1]` clip square.
    #[inline]
    pub fn is_inside(self) -> bool {
        let (x, y) = self.ndc();
        (-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y)
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}
