//! # Core Error Types
//!
//! Errors raised by the chunk data model.

use thiserror::Error;

/// Errors that can occur when addressing or sizing chunk data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A cell index lies outside the chunk volume.
    ///
    /// Callers that walk chunk bounds never produce this; seeing it means
    /// the boundary math upstream is wrong.
    #[error("cell ({x}, {y}, {z}) out of bounds for chunk {width}x{height}x{length}")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested layer.
        y: usize,
        /// Requested row.
        z: usize,
        /// Chunk width.
        width: usize,
        /// Chunk height.
        height: usize,
        /// Chunk length.
        length: usize,
    },

    /// Chunk dimensions that cannot tile the hex grid.
    #[error("invalid chunk dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type for chunk operations.
pub type ChunkResult<T> = Result<T, ChunkError>;
