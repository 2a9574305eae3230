//! # Elevation Properties
//!
//! Grid size, value range and purity across raster shapes and resolutions.

use verdant_terrain::{sample, HeightField, RasterSample, TerrainMesh};

/// Deterministic pseudo-random raster so the tests don't need image files.
fn speckled(width: u32, height: u32, salt: u32) -> RasterSample {
    RasterSample::from_fn(width, height, |x, y| {
        let mut h = x.wrapping_mul(0x9E37_79B9) ^ y.wrapping_mul(0x85EB_CA6B) ^ salt;
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        (h & 0xFFFF) as f32 / 65535.0
    })
    .unwrap()
}

/// Test: R² values, all normalized, for square rasters of many sizes.
#[test]
fn test_square_raster_any_resolution() {
    for width in [1u32, 3, 64, 255] {
        let raster = speckled(width, width, width);
        for resolution in [1u32, 2, 17, 128, 300] {
            let grid = sample(&raster, resolution).unwrap();
            assert_eq!(grid.values().len(), (resolution * resolution) as usize);
            assert!(
                grid.values().iter().all(|v| (0.0..=1.0).contains(v)),
                "value out of range for {width}px at resolution {resolution}"
            );
        }
    }
}

/// Test: Identical inputs give bit-identical grids.
#[test]
fn test_sampling_is_pure() {
    let raster = speckled(97, 61, 7);
    let first = sample(&raster, 128).unwrap();
    for _ in 0..5 {
        let again = sample(&raster, 128).unwrap();
        let same_bits = first
            .values()
            .iter()
            .zip(again.values())
            .all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(same_bits);
    }
}

/// Test: The displaced plane follows the grid exactly at its vertices.
#[test]
fn test_mesh_matches_grid_at_vertices() {
    let raster = speckled(128, 128, 3);
    let grid = sample(&raster, 128).unwrap();
    let mesh = TerrainMesh::displace(&grid, 20.0, 5.0).unwrap();

    for vertex in mesh.vertices().iter().step_by(37) {
        let [x, y, z] = vertex.position;
        assert!((mesh.height_at(x, y) - z).abs() < 1e-4);
        assert!((0.0..=5.0).contains(&z));
    }
}
