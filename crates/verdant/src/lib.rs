//! # VERDANT
//!
//! Procedural terrain population: a heightmap becomes displaced ground, a
//! catalog of content types is loaded behind a single barrier, and a seeded
//! planner scatters independent copies of that content with distance-tiered
//! detail.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            VERDANT                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐    │
//! │  │ verdant_terrain│   │ verdant_assets │   │ verdant_scatter│    │
//! │  │                │   │                │   │                │    │
//! │  │ • Raster       │   │ • Loader trait │   │ • Planner      │    │
//! │  │ • Sampler      │   │ • Load barrier │   │ • Detail tiers │    │
//! │  │ • Mesh         │   │ • Catalog      │   │ • Composition  │    │
//! │  └───────┬────────┘   └───────┬────────┘   └───────┬────────┘    │
//! │          │                    │                    │             │
//! │          └────────────────────┼────────────────────┘             │
//! │                               ▼                                  │
//! │                      ┌────────────────┐                          │
//! │                      │ ScenePopulator │  (this crate)            │
//! │                      └────────────────┘                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML scene description
//! - `scene`: Populator, populated scene, per-frame tier view

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod scene;

// Re-export the core crates
pub use verdant_assets as assets;
pub use verdant_scatter as scatter;
pub use verdant_terrain as terrain;

pub use config::{
    CatalogConfig, ChannelName, ContentTypeConfig, DetailConfig, LoadingConfig, SceneConfig,
    ScatterConfig, TerrainConfig,
};
pub use error::{SceneError, SceneResult};
pub use scene::{PopulatedScene, ScenePopulator, TierView};
