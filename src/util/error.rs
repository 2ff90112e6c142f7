//! Error types for screenstitch.

use thiserror::Error;

/// Result alias for screenstitch operations.
pub type StitchResult<T> = std::result::Result<T, StitchError>;

/// Errors raised at the host boundary.
///
/// Degenerate geometry (placements with no overlap) is never an error; the
/// scorer reports zero and the compositor skips blending.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// The memory host did not deliver the capacity an allocation needed.
    #[error("arena exhausted: requested {requested} bytes, host committed {committed} bytes")]
    ArenaExhausted { requested: usize, committed: usize },
    /// Image dimensions are zero or overflow the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// A host-supplied pixel buffer is too short for the requested image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Decoding or encoding an image file failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
}
