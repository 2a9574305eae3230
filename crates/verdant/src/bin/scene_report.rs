//! # VERDANT Scene Report
//!
//! Populates a scene from a config file and prints what was placed.
//! Headless: no window, no GPU.
//!
//! ```bash
//! # Default config, viewer at the origin
//! scene_report
//!
//! # Explicit config and viewer position
//! scene_report data/scene.toml 12.0 -4.0 2.0
//!
//! # More detail
//! RUST_LOG=verdant=debug scene_report
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;
use verdant::assets::FileAssetLoader;
use verdant::terrain::RasterSample;
use verdant::{PopulatedScene, SceneConfig, SceneError, ScenePopulator, SceneResult};

const DEFAULT_CONFIG: &str = "data/scene.toml";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = PathBuf::from(args.first().map_or(DEFAULT_CONFIG, String::as_str));
    let viewer = match parse_viewer(&args[args.len().min(1)..]) {
        Some(viewer) => viewer,
        None => {
            eprintln!("usage: scene_report [config.toml] [x y z]");
            return ExitCode::FAILURE;
        }
    };

    match run(&config_path, viewer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scene population failed");
            ExitCode::FAILURE
        }
    }
}

/// Viewer position from the trailing arguments; origin when absent.
fn parse_viewer(args: &[String]) -> Option<[f32; 3]> {
    match args {
        [] => Some([0.0; 3]),
        [x, y, z] => Some([x.parse().ok()?, y.parse().ok()?, z.parse().ok()?]),
        _ => None,
    }
}

fn run(config_path: &Path, viewer: [f32; 3]) -> SceneResult<()> {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let config = SceneConfig::load(config_path)?.relative_to(base_dir);
    let raster = load_raster(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| SceneError::io("<runtime>", e))?;

    let loader = Arc::new(FileAssetLoader::new(&config.loading.asset_root));
    let populator = ScenePopulator::new(config, loader, runtime.handle().clone())?;
    let scene = runtime.block_on(populator.populate_async(&raster))?;

    print_report(populator.config(), &scene, viewer)
}

fn load_raster(config: &SceneConfig) -> SceneResult<RasterSample> {
    match &config.terrain.heightmap {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| SceneError::io(path, e))?;
            Ok(RasterSample::decode(&bytes, config.terrain.channel.into())?)
        }
        None => Ok(RasterSample::from_fn(2, 2, |_, _| 0.0)?),
    }
}

fn print_report(config: &SceneConfig, scene: &PopulatedScene<Vec<u8>>, viewer: [f32; 3]) -> SceneResult<()> {
    let types = &config.catalog.types;
    let (low, high) = scene.grid().min_max();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                      VERDANT SCENE REPORT");
    println!("═══════════════════════════════════════════════════════════════════");
    println!(
        "Terrain:    {}² samples, elevation {:.2}..{:.2}, {} vertices",
        scene.grid().resolution(),
        low * config.terrain.height_scale,
        high * config.terrain.height_scale,
        scene.mesh().vertices().len()
    );
    println!(
        "Placements: {} placed, {} omitted (seed {})",
        scene.instances().len(),
        scene.omitted(),
        config.scatter.seed
    );

    for &type_index in scene.unavailable_types() {
        println!("  unavailable: {}", types[type_index].name);
    }
    for failure in scene.failures() {
        println!("  failed: {failure}");
    }

    let mut view = scene.tier_view(config.detail.hysteresis)?;
    let tiers = view.update(scene, viewer);

    println!("───────────────────────────────────────────────────────────────────");
    println!("Viewer at ({:.1}, {:.1}, {:.1})", viewer[0], viewer[1], viewer[2]);
    for (type_index, ty) in types.iter().enumerate() {
        let mut per_tier = vec![0usize; ty.distances.len()];
        for (instance, &tier) in scene.instances().iter().zip(tiers) {
            if instance.type_index == type_index {
                per_tier[tier] += 1;
            }
        }
        let placed: usize = per_tier.iter().sum();
        println!("  {:<12} {placed:>5} placed, per tier {per_tier:?}", ty.name);
    }

    Ok(())
}
