//! # Raster Input
//!
//! A heightmap arrives as image bytes and is reduced to one normalized channel.
//! The sampler never sees the image crate; it only reads `RasterSource`.

use crate::error::{TerrainError, TerrainResult};

/// Channel read from a decoded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RasterChannel {
    /// Perceptual brightness of the pixel.
    #[default]
    Luma,
    /// Red component.
    Red,
    /// Green component.
    Green,
    /// Blue component.
    Blue,
    /// Alpha component.
    Alpha,
}

impl RasterChannel {
    /// Offset of this channel in an RGBA pixel, `None` for luma.
    #[inline]
    const fn rgba_offset(self) -> Option<usize> {
        match self {
            Self::Luma => None,
            Self::Red => Some(0),
            Self::Green => Some(1),
            Self::Blue => Some(2),
            Self::Alpha => Some(3),
        }
    }
}

/// Anything the elevation sampler can read from.
pub trait RasterSource {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Normalized channel value at `(x, y)`, in [0, 1].
    ///
    /// Callers guarantee `x < width` and `y < height`.
    fn channel(&self, x: u32, y: u32) -> f32;
}

/// A decoded, immutable single-channel raster.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterSample {
    width: u32,
    height: u32,
    /// Row-major normalized values.
    values: Vec<f32>,
}

impl RasterSample {
    /// Decodes image bytes and keeps one channel.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the bytes are not a supported image, or
    /// `EmptyRaster` if the image has no pixels.
    pub fn decode(bytes: &[u8], channel: RasterChannel) -> TerrainResult<Self> {
        let image =
            image::load_from_memory(bytes).map_err(|e| TerrainError::Decode(e.to_string()))?;

        let raster = match channel.rgba_offset() {
            None => {
                let luma = image.to_luma8();
                let (width, height) = luma.dimensions();
                Self::from_luma8(width, height, luma.as_raw())?
            }
            Some(offset) => {
                let rgba = image.to_rgba8();
                let (width, height) = rgba.dimensions();
                let picked: Vec<u8> = rgba.as_raw().iter().skip(offset).step_by(4).copied().collect();
                Self::from_luma8(width, height, &picked)?
            }
        };

        tracing::debug!(
            width = raster.width,
            height = raster.height,
            ?channel,
            "decoded heightmap raster"
        );
        Ok(raster)
    }

    /// Builds a raster from 8-bit samples, one byte per pixel.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRaster` for a zero dimension or `BufferSize` when
    /// `pixels.len() != width * height`.
    pub fn from_luma8(width: u32, height: u32, pixels: &[u8]) -> TerrainResult<Self> {
        let expected = Self::checked_len(width, height)?;
        if pixels.len() != expected {
            return Err(TerrainError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            values: pixels.iter().map(|&p| f32::from(p) / 255.0).collect(),
        })
    }

    /// Builds a raster by evaluating `f(x, y)` for every pixel.
    ///
    /// Values are clamped to [0, 1]; NaN becomes 0.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRaster` for a zero dimension.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> TerrainResult<Self> {
        let len = Self::checked_len(width, height)?;
        let mut values = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                values.push(normalize(f(x, y)));
            }
        }
        Ok(Self { width, height, values })
    }

    fn checked_len(width: u32, height: u32) -> TerrainResult<usize> {
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyRaster { width, height });
        }
        Ok(width as usize * height as usize)
    }
}

impl RasterSource for RasterSample {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn channel(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }
}

/// Clamps into [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn normalize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
