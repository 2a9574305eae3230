//! # VERDANT Terrain
//!
//! Turns a raster heightmap into terrain the renderer can displace.
//!
//! ## Design Principles
//!
//! 1. **Pure**: Sampling has no hidden state and performs no I/O
//! 2. **Resampled, never cropped**: Output resolution is chosen by the caller
//! 3. **Scale-free**: Grid values stay in [0, 1]; height scale is applied by the mesh
//!
//! ## Core Components
//!
//! - `RasterSample`: Decoded single-channel raster
//! - `sample`: Raster to `ElevationGrid`
//! - `TerrainMesh`: Displaced vertex plane, also a `HeightField`
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_terrain::{sample, RasterChannel, RasterSample, TerrainMesh};
//!
//! let raster = RasterSample::decode(&png_bytes, RasterChannel::Red)?;
//! let grid = sample(&raster, 128)?;
//! let mesh = TerrainMesh::displace(&grid, 20.0, 5.0)?;
//!
//! let ground = mesh.height_at(3.0, -4.5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod mesh;
pub mod raster;
pub mod sampler;

pub use error::{TerrainError, TerrainResult};
pub use mesh::{FlatGround, HeightField, TerrainMesh, TerrainVertex};
pub use raster::{RasterChannel, RasterSample, RasterSource};
pub use sampler::{sample, ElevationGrid};
