//! # Scene Population
//!
//! ## Flow
//!
//! ```text
//!   begin_batch(catalog) ──────── loads run on the runtime ───────┐
//!        │                                                        │
//!   sample(raster) -> displace -> TerrainMesh                     │
//!        │                                                        ▼
//!        └──────────────── wait for batch ◀────────────── continuation
//!                                 │
//!               group -> TemplateLibrary (failed types = None)
//!                                 │
//!               plan(seed) -> compose(mesh) -> PopulatedScene
//! ```
//!
//! Terrain work overlaps the loads. Placement only starts once every request
//! has resolved, so it never sees a half-loaded template. A terrain error
//! cancels the outstanding loads.

use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{info, warn};
use verdant_assets::{AssetLoadBarrier, AssetLoader, Catalog, LoadBatch, LoadError, TypeAssets};
use verdant_scatter::{
    compose, plan, DetailTierSet, DetailVariant, PlacementInstance, SeededRandom, Template,
    TemplateLibrary, TierTracker,
};
use verdant_terrain::{sample, ElevationGrid, RasterSource, TerrainMesh};

use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};

/// Builds scenes from a config and a loader.
pub struct ScenePopulator<L> {
    config: SceneConfig,
    catalog: Catalog,
    barrier: AssetLoadBarrier<L>,
    flavor: RuntimeFlavor,
}

impl<L> ScenePopulator<L>
where
    L: AssetLoader,
    L::Payload: Clone,
{
    /// Creates a populator that spawns loads on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` fails validation.
    pub fn new(config: SceneConfig, loader: Arc<L>, runtime: Handle) -> SceneResult<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let flavor = runtime.runtime_flavor();
        let mut barrier = AssetLoadBarrier::new(loader, runtime);
        if let Some(timeout) = config.loading.timeout() {
            barrier = barrier.with_timeout(timeout);
        }
        Ok(Self {
            config,
            catalog,
            barrier,
            flavor,
        })
    }

    /// Scene config.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Asset catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Populates a scene, blocking the calling thread until every asset resolves.
    ///
    /// The runtime must be multi-threaded so its workers drive the loads while
    /// this thread waits, and this must not be called from one of those
    /// workers. On a current-thread runtime use
    /// [`populate_async`](Self::populate_async).
    ///
    /// # Errors
    ///
    /// Returns `CurrentThreadRuntime` before issuing any load if the runtime
    /// is current-thread, `Terrain` if the raster cannot be sampled, or
    /// `Scatter` if planning fails. Asset failures omit placements instead.
    pub fn populate<R: RasterSource + ?Sized>(&self, raster: &R) -> SceneResult<PopulatedScene<L::Payload>> {
        if self.flavor == RuntimeFlavor::CurrentThread {
            return Err(SceneError::CurrentThreadRuntime);
        }
        let batch = self.begin();
        let terrain = match self.build_terrain(raster) {
            Ok(terrain) => terrain,
            Err(error) => {
                let cancelled = batch.cancel();
                warn!(cancelled, %error, "terrain failed, cancelling asset loads");
                return Err(error);
            }
        };
        batch.wait();
        self.finish(&batch, terrain)
    }

    /// Async form of [`populate`](Self::populate).
    ///
    /// # Errors
    ///
    /// As [`populate`](Self::populate).
    pub async fn populate_async<R: RasterSource + ?Sized>(
        &self,
        raster: &R,
    ) -> SceneResult<PopulatedScene<L::Payload>> {
        let batch = self.begin();
        let terrain = match self.build_terrain(raster) {
            Ok(terrain) => terrain,
            Err(error) => {
                let cancelled = batch.cancel();
                warn!(cancelled, %error, "terrain failed, cancelling asset loads");
                return Err(error);
            }
        };
        batch.settled().await;
        self.finish(&batch, terrain)
    }

    fn begin(&self) -> LoadBatch<L::Payload> {
        let expected = self.catalog.asset_count();
        self.barrier.begin_batch(self.catalog.locators(), move || {
            info!(expected, "scene assets resolved");
        })
    }

    fn build_terrain<R: RasterSource + ?Sized>(&self, raster: &R) -> SceneResult<(ElevationGrid, TerrainMesh)> {
        let terrain = &self.config.terrain;
        let grid = sample(raster, terrain.resolution)?;
        let mesh = TerrainMesh::displace(&grid, terrain.extent, terrain.height_scale)?;
        Ok((grid, mesh))
    }

    fn finish(
        &self,
        batch: &LoadBatch<L::Payload>,
        (grid, mesh): (ElevationGrid, TerrainMesh),
    ) -> SceneResult<PopulatedScene<L::Payload>> {
        let grouped = self.catalog.group(batch.take_requests()?)?;

        let mut templates = Vec::with_capacity(grouped.len());
        let mut failures = Vec::new();
        let mut unavailable = Vec::new();
        for ((index, assets), ty) in grouped.into_iter().enumerate().zip(&self.config.catalog.types) {
            match assets {
                TypeAssets::Complete(payloads) => {
                    let variants = payloads
                        .into_iter()
                        .zip(&ty.distances)
                        .map(|(payload, &distance)| DetailVariant::new(payload, distance))
                        .collect();
                    let tiers = DetailTierSet::build(variants)?;
                    templates.push(Some(Template::new(tiers).with_scale(ty.scale)));
                }
                TypeAssets::Incomplete(errors) => {
                    for error in &errors {
                        warn!(type_index = index, name = %ty.name, %error, "asset failed to load");
                    }
                    failures.extend(errors);
                    unavailable.push(index);
                    templates.push(None);
                }
            }
        }
        let library = TemplateLibrary::from_templates(templates);

        let mut rng = SeededRandom::new(self.config.scatter.seed);
        let specs = plan(&self.config.placement_request(), &mut rng)?;
        let composition = compose(&specs, &library, &mesh)?;

        info!(
            placed = composition.instances.len(),
            omitted = composition.omitted,
            unavailable_types = unavailable.len(),
            "scene populated"
        );

        Ok(PopulatedScene {
            grid,
            mesh,
            instances: composition.instances,
            omitted: composition.omitted,
            unavailable_types: unavailable,
            failures,
        })
    }
}

/// Terrain and placed content, ready for the renderer.
#[derive(Clone, Debug)]
pub struct PopulatedScene<C> {
    grid: ElevationGrid,
    mesh: TerrainMesh,
    instances: Vec<PlacementInstance<C>>,
    omitted: usize,
    unavailable_types: Vec<usize>,
    failures: Vec<LoadError>,
}

impl<C> PopulatedScene<C> {
    /// Sampled elevation.
    #[must_use]
    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    /// Displaced terrain.
    #[must_use]
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Placed content in plan order.
    #[must_use]
    pub fn instances(&self) -> &[PlacementInstance<C>] {
        &self.instances
    }

    /// Placements dropped because their type failed to load.
    #[must_use]
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Types with at least one failed asset.
    #[must_use]
    pub fn unavailable_types(&self) -> &[usize] {
        &self.unavailable_types
    }

    /// Every load failure.
    #[must_use]
    pub fn failures(&self) -> &[LoadError] {
        &self.failures
    }

    /// Active tier index of every instance for `viewer`, no hysteresis.
    #[must_use]
    pub fn active_tiers(&self, viewer: [f32; 3]) -> Vec<usize> {
        self.instances
            .iter()
            .map(|i| i.detail.select_index(i.distance_to(viewer)))
            .collect()
    }

    /// Per-instance trackers with hysteresis `band`.
    ///
    /// # Errors
    ///
    /// Returns `Scatter` if `band` is negative or non-finite.
    pub fn tier_view(&self, band: f32) -> SceneResult<TierView> {
        let tracker = TierTracker::new(band)?;
        Ok(TierView {
            trackers: vec![tracker; self.instances.len()],
            tiers: Vec::with_capacity(self.instances.len()),
        })
    }
}

/// Frame-to-frame tier state for a scene.
#[derive(Clone, Debug)]
pub struct TierView {
    trackers: Vec<TierTracker>,
    tiers: Vec<usize>,
}

impl TierView {
    /// Updates every instance for `viewer` and returns the active tiers.
    pub fn update<C>(&mut self, scene: &PopulatedScene<C>, viewer: [f32; 3]) -> &[usize] {
        self.tiers.clear();
        self.tiers.extend(
            self.trackers
                .iter_mut()
                .zip(&scene.instances)
                .map(|(tracker, instance)| tracker.update(&instance.detail, instance.distance_to(viewer))),
        );
        &self.tiers
    }
}
