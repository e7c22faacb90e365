use crate::coords::Rect;

use super::{next_base, quad_indices, rect_corners, GeometryError};

/// Vertex/index data for one box-pipeline draw.
///
/// Positions are in source pixels; the vertex stage maps them with the
/// draw's view rectangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxGeometry {
    pub positions: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl BoxGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(quads: usize) -> Self {
        Self {
            positions: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Clears recorded quads, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Appends one rectangle (two triangles). Negative extents are normalized.
    pub fn push_rect(&mut self, rect: Rect) -> Result<(), GeometryError> {
        let base = next_base(self.positions.len())?;
        self.positions.extend_from_slice(&rect_corners(rect.normalized()));
        self.indices.extend_from_slice(&quad_indices(base));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MAX_QUADS;

    #[test]
    fn push_rect_emits_corners_in_order() {
        let mut g = BoxGeometry::new();
        g.push_rect(Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(
            g.positions,
            vec![[1.0, 2.0], [1.0, 6.0], [4.0, 6.0], [4.0, 2.0]]
        );
        assert_eq!(g.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn indices_are_offset_per_quad() {
        let mut g = BoxGeometry::new();
        g.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        g.push_rect(Rect::new(5.0, 5.0, 1.0, 1.0)).unwrap();
        assert_eq!(g.quad_count(), 2);
        assert_eq!(&g.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn negative_extent_is_normalized() {
        let mut g = BoxGeometry::new();
        g.push_rect(Rect::new(4.0, 6.0, -3.0, -4.0)).unwrap();
        assert_eq!(g.positions[0], [1.0, 2.0]);
        assert_eq!(g.positions[2], [4.0, 6.0]);
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let mut g = BoxGeometry::with_capacity(MAX_QUADS);
        for _ in 0..MAX_QUADS {
            g.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        }
        assert_eq!(
            g.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
            Err(GeometryError::IndexOverflow { quads: MAX_QUADS })
        );
        assert_eq!(*g.indices.iter().max().unwrap(), u16::MAX);
    }

    #[test]
    fn clear_empties_buffers() {
        let mut g = BoxGeometry::new();
        g.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.quad_count(), 0);
    }
}
