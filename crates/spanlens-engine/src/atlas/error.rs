use thiserror::Error;

/// Errors raised while building an atlas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("font load error: {0}")]
    FontLoad(String),

    #[error("atlas dimensions must be non-zero")]
    ZeroSize,

    #[error("texel data length {actual} does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32, actual: usize },

    #[error("atlas has no glyphs")]
    Empty,

    #[error("atlas grid {columns}x{rows} with {cell_width}x{cell_height} cells overflows")]
    GridTooLarge { columns: u32, rows: u32, cell_width: u32, cell_height: u32 },

    #[error("character code {0} is outside the atlas grid")]
    CodeOutOfRange(u32),
}
