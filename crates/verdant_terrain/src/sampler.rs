//! # Elevation Sampler
//!
//! Resamples a raster onto a square grid chosen by the mesh, not by the image.
//!
//! ## Mapping
//!
//! ```text
//! px = floor(col * raster.width  / resolution)
//! py = floor(row * raster.height / resolution)
//! ```
//!
//! Integer arithmetic keeps the mapping exact, so the same raster and
//! resolution always produce bit-identical grids.

use crate::error::{TerrainError, TerrainResult};
use crate::raster::{normalize, RasterSource};

/// Square grid of normalized elevations, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationGrid {
    resolution: u32,
    values: Vec<f32>,
}

impl ElevationGrid {
    /// Cells per side.
    #[inline]
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// All values, row-major, `resolution²` long.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at `(col, row)`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> Option<f32> {
        if col >= self.resolution || row >= self.resolution {
            return None;
        }
        Some(self.values[row as usize * self.resolution as usize + col as usize])
    }

    /// Lowest and highest value in the grid.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Hands the values to the caller that builds the displaced mesh.
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Samples `raster` onto a `resolution × resolution` grid.
///
/// # Errors
///
/// Returns `EmptyRaster` if the raster has a zero dimension and
/// `InvalidResolution` if `resolution` is zero.
pub fn sample<R: RasterSource + ?Sized>(raster: &R, resolution: u32) -> TerrainResult<ElevationGrid> {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyRaster { width, height });
    }
    if resolution == 0 {
        return Err(TerrainError::InvalidResolution(resolution));
    }

    let res = u64::from(resolution);
    // Column lookup is identical for every row.
    let columns: Vec<u32> = (0..res)
        .map(|col| (col * u64::from(width) / res) as u32)
        .collect();

    let mut values = Vec::with_capacity(resolution as usize * resolution as usize);
    for row in 0..res {
        let py = (row * u64::from(height) / res) as u32;
        for &px in &columns {
            values.push(normalize(raster.channel(px, py)));
        }
    }

    tracing::debug!(width, height, resolution, "sampled elevation grid");
    Ok(ElevationGrid { resolution, values })
}
