use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The buffer already holds as many quads as 16-bit indices can address.
    #[error("geometry buffer full at {quads} quads (16-bit indices)")]
    IndexOverflow { quads: usize },
}
