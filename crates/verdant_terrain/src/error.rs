//! # Terrain Error Types

use thiserror::Error;

/// Errors that can occur while building terrain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// Raster has a zero dimension.
    #[error("invalid raster: {width}x{height}")]
    EmptyRaster {
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
    },

    /// Requested grid resolution cannot be produced.
    #[error("invalid resolution: {0}")]
    InvalidResolution(u32),

    /// Pixel buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    BufferSize {
        /// Samples implied by width x height.
        expected: usize,
        /// Samples actually supplied.
        actual: usize,
    },

    /// Mesh parameters are out of range.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The image decoder rejected the bytes.
    #[error("raster decode failed: {0}")]
    Decode(String),
}

impl TerrainError {
    /// Returns true for caller defects (bad raster, resolution or geometry).
    ///
    /// These are never retried.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
