//! # Displaced Terrain Mesh
//!
//! Applies an `ElevationGrid` to a flat plane, one vertex per grid cell.
//!
//! ## Layout
//!
//! ```text
//!   row 0  (+y edge)   v0 ── v1 ── v2
//!                      │  ╲  │  ╲  │
//!   row 1              v3 ── v4 ── v5
//!                      │  ╲  │  ╲  │
//!   row 2  (-y edge)   v6 ── v7 ── v8
//!                    -x            +x
//! ```
//!
//! The plane is centred on the origin with side `extent`. Planar axes are
//! `x` and `y`; `z` is elevation (`value * height_scale`).

use bytemuck::{Pod, Zeroable};

use crate::error::{TerrainError, TerrainResult};
use crate::sampler::ElevationGrid;

/// Ground height lookup used to seat placed content.
pub trait HeightField {
    /// Elevation at planar `(x, y)`.
    fn height_at(&self, x: f32, y: f32) -> f32;
}

/// Constant-height ground.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround(pub f32);

impl HeightField for FlatGround {
    #[inline]
    fn height_at(&self, _x: f32, _y: f32) -> f32 {
        self.0
    }
}

/// Single terrain vertex, laid out for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// World position `[x, y, z]`, z up.
    pub position: [f32; 3],
    /// Texture coordinate, v = 1 on the +y edge.
    pub uv: [f32; 2],
}

/// Displaced terrain plane.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    /// Vertices per side.
    resolution: u32,
    /// Side length in world units.
    extent: f32,
    /// Vertical scale applied to grid values.
    height_scale: f32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
}

impl TerrainMesh {
    /// Builds the displaced plane for `grid`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` if the grid has fewer than 2 cells per side,
    /// or `InvalidGeometry` if `extent` is not positive and finite or
    /// `height_scale` is not finite.
    pub fn displace(grid: &ElevationGrid, extent: f32, height_scale: f32) -> TerrainResult<Self> {
        let resolution = grid.resolution();
        if resolution < 2 {
            return Err(TerrainError::InvalidResolution(resolution));
        }
        if !(extent.is_finite() && extent > 0.0) {
            return Err(TerrainError::InvalidGeometry(format!("extent {extent}")));
        }
        if !height_scale.is_finite() {
            return Err(TerrainError::InvalidGeometry(format!("height scale {height_scale}")));
        }

        let n = resolution as usize;
        let segments = (n - 1) as f32;
        let step = extent / segments;
        let half = extent * 0.5;

        let mut vertices = Vec::with_capacity(n * n);
        for (i, &value) in grid.values().iter().enumerate() {
            let (row, col) = (i / n, i % n);
            vertices.push(TerrainVertex {
                position: [
                    -half + col as f32 * step,
                    half - row as f32 * step,
                    value * height_scale,
                ],
                uv: [col as f32 / segments, 1.0 - row as f32 / segments],
            });
        }

        let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
        let n32 = resolution;
        for row in 0..n32 - 1 {
            for col in 0..n32 - 1 {
                let a = row * n32 + col;
                let b = a + n32;
                let c = b + 1;
                let d = a + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        tracing::debug!(
            resolution,
            extent,
            height_scale,
            triangles = indices.len() / 3,
            "displaced terrain mesh"
        );

        Ok(Self {
            resolution,
            extent,
            height_scale,
            vertices,
            indices,
        })
    }

    /// Vertices per side.
    #[inline]
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Side length in world units.
    #[inline]
    #[must_use]
    pub const fn extent(&self) -> f32 {
        self.extent
    }

    /// Vertical scale applied to grid values.
    #[inline]
    #[must_use]
    pub const fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Vertex buffer.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Triangle list, counter-clockwise seen from +z.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Raw vertex bytes.
    #[inline]
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    fn z(&self, col: usize, row: usize) -> f32 {
        self.vertices[row * self.resolution as usize + col].position[2]
    }
}

impl HeightField for TerrainMesh {
    /// Bilinear height, clamped to the plane's edges.
    fn height_at(&self, x: f32, y: f32) -> f32 {
        let last = (self.resolution - 1) as f32;
        let step = self.extent / last;
        let half = self.extent * 0.5;

        let fc = ((x + half) / step).clamp(0.0, last);
        let fr = ((half - y) / step).clamp(0.0, last);
        if !(fc.is_finite() && fr.is_finite()) {
            return self.z(0, 0);
        }

        let (c0, r0) = (fc.floor() as usize, fr.floor() as usize);
        let max = self.resolution as usize - 1;
        let (c1, r1) = ((c0 + 1).min(max), (r0 + 1).min(max));
        let (tx, ty) = (fc - c0 as f32, fr - r0 as f32);

        let top = self.z(c0, r0) + (self.z(c1, r0) - self.z(c0, r0)) * tx;
        let bottom = self.z(c0, r1) + (self.z(c1, r1) - self.z(c0, r1)) * tx;
        top + (bottom - top) * ty
    }
}
