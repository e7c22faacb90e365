use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("framebuffer dimensions must be non-zero (got {width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}
