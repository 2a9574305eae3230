//! # Scene Population Tests
//!
//! Config in, populated scene out, with an in-memory loader.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use verdant::assets::{AssetLoader, LoadError, LoadFailure};
use verdant::terrain::{HeightField, RasterSample, RasterSource, TerrainError};
use verdant::{SceneConfig, SceneError, ScenePopulator};

const PARK: &str = r#"
    [terrain]
    resolution = 32
    extent = 60.0
    height_scale = 4.0

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

    [[catalog.types]]
    name = "car"
    distances = [0.0]

    [scatter]
    region = { shape = "circle", center = [0.0, 0.0], radius = 30.0 }
    spacing = 3.0
    exclusions = [
        { min = [-26.0, -28.0], max = [-8.0, -10.0] },
        { min = [-3.0, -2.0], max = [3.0, 2.0] },
    ]
    seed = 42
"#;

/// Loader serving `mesh:{locator}` after a short delay, failing listed locators.
struct MemoryLoader {
    failing: Vec<&'static str>,
    calls: AtomicUsize,
}

impl MemoryLoader {
    fn new(failing: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            failing: failing.to_vec(),
            calls: AtomicUsize::new(0),
        })
    }
}

impl AssetLoader for MemoryLoader {
    type Payload = String;

    fn load(&self, locator: &str) -> impl Future<Output = Result<String, LoadError>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let fails = self.failing.iter().any(|f| *f == locator);
        let locator = locator.to_owned();
        async move {
            tokio::time::sleep(Duration::from_millis(2 + (call as u64 * 7) % 11)).await;
            if fails {
                Err(LoadError::new(locator, LoadFailure::NotFound))
            } else {
                Ok(format!("mesh:{locator}"))
            }
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn slope() -> RasterSample {
    RasterSample::from_fn(64, 64, |x, y| (x + y) as f32 / 126.0).unwrap()
}

/// Test: Every asset loads; placements respect the region and sit on the terrain.
#[test]
fn test_populate_full_scene() {
    let rt = runtime();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let loader = MemoryLoader::new(&[]);
    let populator = ScenePopulator::new(config, Arc::clone(&loader), rt.handle().clone()).unwrap();

    let scene = populator.populate(&slope()).unwrap();

    assert_eq!(loader.calls.load(Ordering::SeqCst), 6);
    assert!(!scene.instances().is_empty());
    assert_eq!(scene.omitted(), 0);
    assert!(scene.failures().is_empty());
    assert_eq!(scene.grid().resolution(), 32);

    for instance in scene.instances() {
        let [x, y, z] = instance.position;
        assert!((x * x + y * y).sqrt() < 30.0);
        assert!((z - scene.mesh().height_at(x, y)).abs() < 1e-5);
        assert_eq!(instance.detail.len(), [3, 2, 1][instance.type_index]);
        assert_eq!(
            instance.detail.variants()[0].content,
            format!("mesh:models/{}_0.glb", instance.type_index)
        );
        if instance.type_index == 0 {
            assert_eq!(instance.scale, [0.5; 3]);
        }
    }
}

/// Test: Same config twice gives the same placements.
#[test]
fn test_populate_is_reproducible() {
    let rt = runtime();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let populator = ScenePopulator::new(config, MemoryLoader::new(&[]), rt.handle().clone()).unwrap();

    let first = populator.populate(&slope()).unwrap();
    let second = populator.populate(&slope()).unwrap();
    assert_eq!(first.instances(), second.instances());
}

/// Test: A type with one failed level is omitted entirely; others still placed.
#[test]
fn test_failed_type_omitted() {
    let rt = runtime();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let loader = MemoryLoader::new(&["models/1_1.glb"]);
    let populator = ScenePopulator::new(config, loader, rt.handle().clone()).unwrap();

    let scene = populator.populate(&slope()).unwrap();

    assert_eq!(scene.unavailable_types(), &[1]);
    assert_eq!(scene.failures().len(), 1);
    assert_eq!(scene.failures()[0].locator, "models/1_1.glb");
    assert!(scene.omitted() > 0);
    assert!(scene.instances().iter().all(|i| i.type_index != 1));
    assert!(scene.instances().iter().any(|i| i.type_index == 0));
}

/// Test: Far viewers see coarse tiers, near viewers fine ones.
#[test]
fn test_active_tiers_follow_viewer() {
    let rt = runtime();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let populator = ScenePopulator::new(config, MemoryLoader::new(&[]), rt.handle().clone()).unwrap();
    let scene = populator.populate(&slope()).unwrap();

    let far = scene.active_tiers([1000.0, 0.0, 0.0]);
    for (instance, tier) in scene.instances().iter().zip(&far) {
        assert_eq!(*tier, instance.detail.len() - 1);
    }

    let near = scene.active_tiers([0.0, 0.0, 0.0]);
    assert!(near.iter().any(|&t| t == 0));
    assert!(near.iter().zip(&far).all(|(n, f)| n <= f));

    let mut view = scene.tier_view(0.0).unwrap();
    assert_eq!(view.update(&scene, [0.0, 0.0, 0.0]), near.as_slice());
    assert!(scene.tier_view(-1.0).is_err());
}

/// Test: The async path drives loads on the caller's runtime.
#[tokio::test]
async fn test_populate_async() {
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let populator = ScenePopulator::new(
        config,
        MemoryLoader::new(&["models/2_0.glb"]),
        tokio::runtime::Handle::current(),
    )
    .unwrap();

    let scene = populator.populate_async(&slope()).await.unwrap();
    assert_eq!(scene.unavailable_types(), &[2]);
    assert!(scene.instances().iter().all(|i| i.type_index != 2));
}

/// Raster with no pixels.
struct Blank;

impl RasterSource for Blank {
    fn width(&self) -> u32 {
        0
    }

    fn height(&self) -> u32 {
        0
    }

    fn channel(&self, _x: u32, _y: u32) -> f32 {
        0.0
    }
}

/// Test: A bad raster fails the scene instead of placing on missing terrain.
#[test]
fn test_bad_raster_fails() {
    let rt = runtime();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let populator = ScenePopulator::new(config, MemoryLoader::new(&[]), rt.handle().clone()).unwrap();

    let err = populator.populate(&Blank).unwrap_err();
    assert!(matches!(err, SceneError::Terrain(TerrainError::EmptyRaster { .. })));
}

/// Test: Invalid configs never reach the loader.
#[test]
fn test_invalid_config_rejected() {
    let rt = runtime();
    let mut config = SceneConfig::from_toml_str(PARK).unwrap();
    config.scatter.spacing = -1.0;

    let loader = MemoryLoader::new(&[]);
    let result = ScenePopulator::new(config, Arc::clone(&loader), rt.handle().clone());
    assert!(matches!(result, Err(SceneError::InvalidConfig(_))));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
}

/// Test: Blocking populate refuses a current-thread runtime up front; the async
/// path drives the same runtime to completion.
#[test]
fn test_current_thread_runtime_needs_async_path() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let config = SceneConfig::from_toml_str(PARK).unwrap();
    let loader = MemoryLoader::new(&[]);
    let populator = ScenePopulator::new(config, Arc::clone(&loader), rt.handle().clone()).unwrap();

    let err = populator.populate(&slope()).unwrap_err();
    assert!(matches!(err, SceneError::CurrentThreadRuntime));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);

    let scene = rt.block_on(populator.populate_async(&slope())).unwrap();
    assert_eq!(loader.calls.load(Ordering::SeqCst), 6);
    assert!(!scene.instances().is_empty());
}
