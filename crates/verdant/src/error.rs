//! # Scene Error Types
//!
//! Everything that can stop a scene from being populated. Per-asset load
//! failures are not in here: they omit placements, they don't fail the scene.

use std::path::PathBuf;

use thiserror::Error;
use verdant_assets::AssetError;
use verdant_scatter::ScatterError;
use verdant_terrain::TerrainError;

/// Errors that can occur while configuring or populating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Config or heightmap file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `SceneConfig`.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but describes an unusable scene.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Blocking population was asked of a current-thread runtime, which
    /// cannot drive the loads while the caller waits.
    #[error("blocking populate needs a multi-thread runtime; use populate_async on a current-thread runtime")]
    CurrentThreadRuntime,

    /// Heightmap decoding, sampling or displacement failed.
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    /// Batch bookkeeping failed.
    #[error(transparent)]
    Assets(#[from] AssetError),

    /// Planning or composition failed.
    #[error(transparent)]
    Scatter(#[from] ScatterError),
}

impl SceneError {
    /// Wraps an I/O error with the file it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
