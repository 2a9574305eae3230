//! # Scene Configuration
//!
//! One TOML file describes a scene: terrain source and size, the content
//! catalog with per-type detail distances and scale, and the scatter
//! parameters. Loaded once at startup and validated before anything runs.
//!
//! ```toml
//! [terrain]
//! heightmap = "heightmap.png"
//! resolution = 128
//!
//! [catalog]
//! base = "models/"
//! extension = ".glb"
//!
//! [[catalog.types]]
//! name = "house"
//! distances = [0.0, 10.0, 30.0]
//! scale = [0.5, 0.5, 0.5]
//!
//! [scatter]
//! region = { shape = "circle", center = [0.0, 0.0], radius = 30.0 }
//! spacing = 3.0
//! seed = 42
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use verdant_assets::{Catalog, LocatorScheme};
use verdant_scatter::{DetailTierSet, DetailVariant, PlacementRequest, Rect, Region};
use verdant_terrain::RasterChannel;

use crate::error::{SceneError, SceneResult};

/// Complete scene description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Heightmap and terrain geometry.
    #[serde(default)]
    pub terrain: TerrainConfig,
    /// Content types and asset naming.
    pub catalog: CatalogConfig,
    /// Placement parameters.
    pub scatter: ScatterConfig,
    /// Asset loading behaviour.
    #[serde(default)]
    pub loading: LoadingConfig,
    /// Per-frame detail selection.
    #[serde(default)]
    pub detail: DetailConfig,
}

/// Raster channel names accepted in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelName {
    /// Luminance.
    Luma,
    /// Red.
    #[default]
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Alpha.
    Alpha,
}

impl From<ChannelName> for RasterChannel {
    fn from(name: ChannelName) -> Self {
        match name {
            ChannelName::Luma => Self::Luma,
            ChannelName::Red => Self::Red,
            ChannelName::Green => Self::Green,
            ChannelName::Blue => Self::Blue,
            ChannelName::Alpha => Self::Alpha,
        }
    }
}

/// Terrain section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    /// Heightmap image. Flat ground when absent.
    pub heightmap: Option<PathBuf>,
    /// Channel read as elevation.
    pub channel: ChannelName,
    /// Samples per side.
    pub resolution: u32,
    /// Side length of the terrain plane.
    pub extent: f32,
    /// Elevation of a full-intensity sample.
    pub height_scale: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: None,
            channel: ChannelName::Red,
            resolution: 128,
            extent: 20.0,
            height_scale: 5.0,
        }
    }
}

/// One content type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentTypeConfig {
    /// Display name.
    pub name: String,
    /// Activation distance per detail level, finest first. One asset per entry.
    pub distances: Vec<f32>,
    /// Per-axis scale.
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

const fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

/// Catalog section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Locator prefix.
    #[serde(default)]
    pub base: String,
    /// Locator suffix including the dot.
    #[serde(default)]
    pub extension: String,
    /// Content types, indexed by position.
    pub types: Vec<ContentTypeConfig>,
}

/// Scatter section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScatterConfig {
    /// Placement bounds.
    pub region: Region,
    /// Grid step.
    pub spacing: f32,
    /// Zones kept clear.
    #[serde(default)]
    pub exclusions: Vec<Rect>,
    /// Placement seed.
    #[serde(default)]
    pub seed: u64,
}

/// Loading section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    /// Directory asset locators are resolved against.
    pub asset_root: PathBuf,
    /// Per-asset timeout in milliseconds; none when absent.
    pub timeout_ms: Option<u64>,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            timeout_ms: None,
        }
    }
}

impl LoadingConfig {
    /// Per-asset timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Detail section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetailConfig {
    /// Hysteresis band for tier switches; 0 disables it.
    pub hysteresis: f32,
}

impl SceneConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed TOML and `InvalidConfig` if validation fails.
    pub fn from_toml_str(text: &str) -> SceneResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SceneError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the value cannot be represented.
    pub fn to_toml_string(&self) -> SceneResult<String> {
        toml::to_string_pretty(self).map_err(|e| SceneError::InvalidConfig(e.to_string()))
    }

    /// Resolves relative heightmap and asset paths against `dir`.
    #[must_use]
    pub fn relative_to(mut self, dir: &Path) -> Self {
        if let Some(heightmap) = self.terrain.heightmap.take() {
            self.terrain.heightmap = Some(dir.join(heightmap));
        }
        self.loading.asset_root = dir.join(&self.loading.asset_root);
        self
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first problem found.
    pub fn validate(&self) -> SceneResult<()> {
        let terrain = &self.terrain;
        if terrain.resolution < 2 {
            return Err(invalid(format!(
                "terrain.resolution must be at least 2, got {}",
                terrain.resolution
            )));
        }
        if !(terrain.extent.is_finite() && terrain.extent > 0.0) {
            return Err(invalid(format!("terrain.extent {}", terrain.extent)));
        }
        if !terrain.height_scale.is_finite() {
            return Err(invalid(format!("terrain.height_scale {}", terrain.height_scale)));
        }

        if self.catalog.types.is_empty() {
            return Err(invalid("catalog.types is empty"));
        }
        for (index, ty) in self.catalog.types.iter().enumerate() {
            let variants = ty.distances.iter().map(|&d| DetailVariant::new((), d)).collect();
            DetailTierSet::build(variants)
                .map_err(|e| invalid(format!("catalog type {index} (`{}`): {e}", ty.name)))?;
            if !ty.scale.iter().all(|s| s.is_finite()) {
                return Err(invalid(format!("catalog type {index} (`{}`) scale", ty.name)));
            }
        }

        self.placement_request()
            .validate()
            .map_err(|e| invalid(format!("scatter: {e}")))?;

        let band = self.detail.hysteresis;
        if !(band.is_finite() && band >= 0.0) {
            return Err(invalid(format!("detail.hysteresis {band}")));
        }
        Ok(())
    }

    /// Asset catalog for the configured types.
    ///
    /// # Errors
    ///
    /// Returns `Assets` if the catalog is empty or a type has no levels.
    pub fn catalog(&self) -> SceneResult<Catalog> {
        let scheme = LocatorScheme::new(&self.catalog.base, &self.catalog.extension);
        let levels = self.catalog.types.iter().map(|t| t.distances.len()).collect();
        Ok(Catalog::new(scheme, levels)?)
    }

    /// Planner input for the configured scatter section.
    #[must_use]
    pub fn placement_request(&self) -> PlacementRequest {
        PlacementRequest::new(
            self.scatter.region,
            self.scatter.spacing,
            self.catalog.types.len(),
        )
        .with_exclusions(self.scatter.exclusions.clone())
    }
}

fn invalid(message: impl Into<String>) -> SceneError {
    SceneError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VILLAGE: &str = r#"
        [terrain]
        heightmap = "park.png"
        resolution = 64

        [catalog]
        base = "models/"
        extension = ".glb"

        [[catalog.types]]
        name = "house"
        distances = [0.0, 10.0, 30.0]
        scale = [0.5, 0.5, 0.5]

        [[catalog.types]]
        name = "tree"
        distances = [0.0, 20.0]

        [scatter]
        region = { shape = "circle", center = [0.0, 0.0], radius = 30.0 }
        spacing = 3.0
        exclusions = [
            { min = [-26.0, -28.0], max = [-8.0, -10.0] },
            { min = [-3.0, -2.0], max = [3.0, 2.0] },
        ]
        seed = 42
    "#;

    #[test]
    fn test_parse_village() {
        let config = SceneConfig::from_toml_str(VILLAGE).unwrap();
        assert_eq!(config.terrain.resolution, 64);
        assert!((config.terrain.extent - 20.0).abs() < f32::EPSILON);
        assert_eq!(config.terrain.channel, ChannelName::Red);
        assert_eq!(config.catalog.types.len(), 2);
        assert_eq!(config.catalog.types[1].scale, [1.0; 3]);
        assert_eq!(config.scatter.exclusions.len(), 2);
        assert_eq!(config.loading.timeout(), None);

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.asset_count(), 5);
        assert_eq!(catalog.locators()[3], "models/1_0.glb");

        let request = config.placement_request();
        assert_eq!(request.type_count, 2);
    }

    #[test]
    fn test_round_trip() {
        let config = SceneConfig::from_toml_str(VILLAGE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_relative_paths() {
        let config = SceneConfig::from_toml_str(VILLAGE)
            .unwrap()
            .relative_to(Path::new("/srv/scene"));
        assert_eq!(config.terrain.heightmap, Some(PathBuf::from("/srv/scene/park.png")));
        assert_eq!(config.loading.asset_root, PathBuf::from("/srv/scene/."));
    }

    #[test]
    fn test_rejects_bad_tiers() {
        let text = VILLAGE.replace("[0.0, 20.0]", "[5.0, 20.0]");
        let err = SceneConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig(ref m) if m.contains("tree")), "{err}");

        let text = VILLAGE.replace("[0.0, 20.0]", "[]");
        assert!(SceneConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_rejects_bad_scatter() {
        let text = VILLAGE.replace("spacing = 3.0", "spacing = 0.0");
        assert!(matches!(
            SceneConfig::from_toml_str(&text),
            Err(SceneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let text = VILLAGE.replace("seed = 42", "seed = 42\ndensity = 3");
        assert!(matches!(SceneConfig::from_toml_str(&text), Err(SceneError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }
}
