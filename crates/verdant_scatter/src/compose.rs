//! # Placement Composition
//!
//! Binds planned specs to content. Each placement receives its own copy of
//! its type's template, seated on the ground at the planned position.
//!
//! ## Ownership
//!
//! `C::clone` must produce a structurally independent copy: no shared
//! mutable sub-state between instances or with the template. Plain data
//! (`Vec`, `String`, owned meshes) satisfies this; `Rc<RefCell<_>>` does not.
//!
//! A `TemplateLibrary` can only hold fully loaded templates, so composition
//! cannot observe content that is still arriving.

use tracing::{debug, warn};
use verdant_terrain::HeightField;

use crate::detail::{DetailTierSet, DetailVariant};
use crate::error::{ScatterError, ScatterResult};
use crate::planner::{PlacementSpec, Rotation};

/// Content for one type: its detail tiers and a base scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Template<C> {
    /// Detail variants, finest first.
    pub tiers: DetailTierSet<C>,
    /// Per-axis scale applied to every placement.
    pub scale: [f32; 3],
}

impl<C> Template<C> {
    /// Template at unit scale.
    #[must_use]
    pub const fn new(tiers: DetailTierSet<C>) -> Self {
        Self {
            tiers,
            scale: [1.0; 3],
        }
    }

    /// Sets the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }
}

/// Templates indexed by content type. Missing entries are types whose
/// content failed to load.
#[derive(Clone, Debug)]
pub struct TemplateLibrary<C> {
    templates: Vec<Option<Template<C>>>,
}

impl<C> TemplateLibrary<C> {
    /// Library of `type_count` types, none available yet.
    #[must_use]
    pub fn new(type_count: usize) -> Self {
        Self {
            templates: std::iter::repeat_with(|| None).take(type_count).collect(),
        }
    }

    /// Library from per-type entries.
    #[must_use]
    pub fn from_templates(templates: Vec<Option<Template<C>>>) -> Self {
        Self { templates }
    }

    /// Sets the template for `type_index`.
    ///
    /// # Errors
    ///
    /// Returns `TypeCountMismatch` if `type_index` is out of range.
    pub fn insert(&mut self, type_index: usize, template: Template<C>) -> ScatterResult<()> {
        let available = self.templates.len();
        let slot = self
            .templates
            .get_mut(type_index)
            .ok_or(ScatterError::TypeCountMismatch {
                planned: type_index + 1,
                available,
            })?;
        *slot = Some(template);
        Ok(())
    }

    /// Number of types, available or not.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.templates.len()
    }

    /// Number of types with a template.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.templates.iter().filter(|t| t.is_some()).count()
    }

    /// Template for `type_index`, if it loaded.
    #[inline]
    #[must_use]
    pub fn get(&self, type_index: usize) -> Option<&Template<C>> {
        self.templates.get(type_index).and_then(Option::as_ref)
    }
}

/// Placed content.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementInstance<C> {
    /// Content type.
    pub type_index: usize,
    /// World position, z from the ground.
    pub position: [f32; 3],
    /// Rotation about z.
    pub rotation: Rotation,
    /// Per-axis scale.
    pub scale: [f32; 3],
    /// This instance's own detail tiers.
    pub detail: DetailTierSet<C>,
}

impl<C> PlacementInstance<C> {
    /// Euclidean distance to `viewer`.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, viewer: [f32; 3]) -> f32 {
        let d = [
            self.position[0] - viewer[0],
            self.position[1] - viewer[1],
            self.position[2] - viewer[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }

    /// Variant to draw for `viewer`.
    #[inline]
    #[must_use]
    pub fn active(&self, viewer: [f32; 3]) -> &DetailVariant<C> {
        self.detail.select(self.distance_to(viewer))
    }
}

/// Result of composing a plan.
#[derive(Clone, Debug)]
pub struct Composition<C> {
    /// Placed instances, in plan order.
    pub instances: Vec<PlacementInstance<C>>,
    /// Placements dropped because their type had no template.
    pub omitted: usize,
}

/// Binds every placement to a fresh copy of its type's template.
///
/// Placements whose type has no template are omitted, never half-built.
///
/// # Errors
///
/// Returns `TypeCountMismatch` if a placement names a type beyond the library.
pub fn compose<C, H>(
    specs: &[PlacementSpec],
    library: &TemplateLibrary<C>,
    ground: &H,
) -> ScatterResult<Composition<C>>
where
    C: Clone,
    H: HeightField + ?Sized,
{
    if let Some(max) = specs.iter().map(|s| s.type_index).max() {
        if max >= library.type_count() {
            return Err(ScatterError::TypeCountMismatch {
                planned: max + 1,
                available: library.type_count(),
            });
        }
    }

    let mut omitted_by_type = vec![0usize; library.type_count()];
    let mut instances = Vec::with_capacity(specs.len());

    for spec in specs {
        let Some(template) = library.get(spec.type_index) else {
            omitted_by_type[spec.type_index] += 1;
            continue;
        };
        let [x, y] = spec.position;
        instances.push(PlacementInstance {
            type_index: spec.type_index,
            position: [x, y, ground.height_at(x, y)],
            rotation: spec.rotation,
            scale: template.scale,
            detail: template.tiers.clone(),
        });
    }

    for (type_index, &count) in omitted_by_type.iter().enumerate() {
        if count > 0 {
            warn!(type_index, count, "omitting placements of unavailable content type");
        }
    }

    let omitted = omitted_by_type.iter().sum();
    debug!(placed = instances.len(), omitted, "composed placements");
    Ok(Composition { instances, omitted })
}
