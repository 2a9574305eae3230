//! # Scatter Placement Planner
//!
//! Walks a regular grid over the region's bounding box and turns every
//! admissible site into a `PlacementSpec`.
//!
//! ## Algorithm
//!
//! ```text
//!   for each grid site (row-major, step = spacing, from bbox.min):
//!       accepted = region.contains(site) && !any(exclusion.contains(site))
//!       if accepted:
//!           type     = rng.next_below(type_count)
//!           jitter   = (rng.next_f32() - 0.5) * spacing   (x, then y)
//!           rotation = quarter turn from rng.next_below(4)
//!           position = site + jitter, or site if that leaves the admissible area
//! ```
//!
//! Draw order is fixed, so a seed fully determines the output.
//! Cost is O(area / spacing²); exclusion tests are linear in the zone count.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScatterError, ScatterResult};
use crate::random::RandomSource;
use crate::region::{Rect, Region};

/// Upper bound on enumerated grid sites per request.
pub const MAX_SITES: u64 = 1 << 24;

/// Relative slack when counting grid steps, so a bounding box that is an exact
/// multiple of the spacing keeps its far row and column under f32 rounding.
const STEP_TOLERANCE: f32 = 1e-5;

/// Discrete rotation about the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0 = 0,
    /// Quarter turn.
    Deg90 = 1,
    /// Half turn.
    Deg180 = 2,
    /// Three quarter turns.
    Deg270 = 3,
}

impl Rotation {
    /// Every rotation, in draw order.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Rotation for `index` quarter turns (wraps).
    #[inline]
    #[must_use]
    pub const fn from_quarter_turns(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Quarter turns, 0..4.
    #[inline]
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self as u8
    }

    /// Angle in degrees.
    #[inline]
    #[must_use]
    pub fn degrees(self) -> f32 {
        f32::from(self.quarter_turns()) * 90.0
    }

    /// Angle in radians.
    #[inline]
    #[must_use]
    pub fn radians(self) -> f32 {
        self.degrees().to_radians()
    }
}

/// Inputs to one planning pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRequest {
    /// Bounds sites must fall inside.
    pub region: Region,
    /// Grid step, positive.
    pub spacing: f32,
    /// Zones no site may fall inside.
    pub exclusions: Vec<Rect>,
    /// Number of content types to draw from.
    pub type_count: usize,
}

impl PlacementRequest {
    /// Creates a request with no exclusions.
    #[must_use]
    pub fn new(region: Region, spacing: f32, type_count: usize) -> Self {
        Self {
            region,
            spacing,
            exclusions: Vec::new(),
            type_count,
        }
    }

    /// Replaces the exclusion zones.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: Vec<Rect>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// True if `p` is inside the region and outside every exclusion.
    #[inline]
    #[must_use]
    pub fn admits(&self, p: [f32; 2]) -> bool {
        self.region.contains(p) && !self.exclusions.iter().any(|zone| zone.contains(p))
    }

    /// Checks every argument.
    ///
    /// # Errors
    ///
    /// Returns the matching invalid-input error.
    pub fn validate(&self) -> ScatterResult<()> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(ScatterError::InvalidSpacing(self.spacing));
        }
        if self.type_count == 0 {
            return Err(ScatterError::InvalidTypeCount);
        }
        self.region.validate()?;
        if let Some(index) = self.exclusions.iter().position(|zone| !zone.is_well_formed()) {
            return Err(ScatterError::InvalidExclusion { index });
        }
        Ok(())
    }

    /// Grid columns and rows covering the bounding box.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn grid_dims(&self) -> ScatterResult<(usize, usize)> {
        let [w, h] = self.region.bounding_box().size();
        let steps = [w / self.spacing, h / self.spacing];
        #[allow(clippy::cast_precision_loss)]
        let limit = MAX_SITES as f32;
        if steps.iter().any(|s| !s.is_finite() || *s >= limit) {
            return Err(ScatterError::TooManySites {
                sites: u64::MAX,
                limit: MAX_SITES,
            });
        }

        let [cols, rows] = steps.map(|s| (s + s.max(1.0) * STEP_TOLERANCE).floor() as u64 + 1);
        let sites = cols.saturating_mul(rows);
        if sites > MAX_SITES {
            return Err(ScatterError::TooManySites {
                sites,
                limit: MAX_SITES,
            });
        }
        Ok((cols as usize, rows as usize))
    }
}

/// Candidate grid site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSite {
    /// Grid coordinate.
    pub position: [f32; 2],
    /// Passed the region and exclusion tests.
    pub accepted: bool,
}

/// One planned placement, not yet bound to content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSpec {
    /// Content type, `< type_count`.
    pub type_index: usize,
    /// Base grid coordinate the placement came from.
    pub site: [f32; 2],
    /// Final planar position after jitter.
    pub position: [f32; 2],
    /// Rotation about the vertical axis.
    pub rotation: Rotation,
}

/// Enumerates every grid site of `request`, row-major from the bounding box minimum.
///
/// # Errors
///
/// Returns an invalid-input error if `request` fails validation or the grid
/// would exceed [`MAX_SITES`].
pub fn enumerate_sites(
    request: &PlacementRequest,
) -> ScatterResult<impl Iterator<Item = PlacementSite> + '_> {
    request.validate()?;
    let (cols, rows) = request.grid_dims()?;
    let bounds = request.region.bounding_box();
    let spacing = request.spacing;

    Ok((0..rows).flat_map(move |row| {
        (0..cols).map(move |col| {
            // The last step may overshoot the box by rounding; snap it back.
            #[allow(clippy::cast_precision_loss)]
            let position = [
                (bounds.min[0] + col as f32 * spacing).min(bounds.max[0]),
                (bounds.min[1] + row as f32 * spacing).min(bounds.max[1]),
            ];
            PlacementSite {
                position,
                accepted: request.admits(position),
            }
        })
    }))
}

/// Plans placements for `request`, drawing from `rng`.
///
/// # Errors
///
/// Returns an invalid-input error for non-positive spacing or type count,
/// a degenerate region or exclusion, or an oversized grid.
pub fn plan<R: RandomSource + ?Sized>(
    request: &PlacementRequest,
    rng: &mut R,
) -> ScatterResult<Vec<PlacementSpec>> {
    let mut specs = Vec::new();
    let mut rejected = 0usize;
    let mut kept_base = 0usize;

    for site in enumerate_sites(request)? {
        if !site.accepted {
            rejected += 1;
            continue;
        }

        let type_index = rng.next_below(request.type_count);
        let jitter_x = (rng.next_f32() - 0.5) * request.spacing;
        let jitter_y = (rng.next_f32() - 0.5) * request.spacing;
        let rotation = Rotation::from_quarter_turns(rng.next_below(Rotation::ALL.len()));

        let jittered = [site.position[0] + jitter_x, site.position[1] + jitter_y];
        let position = if request.admits(jittered) {
            jittered
        } else {
            kept_base += 1;
            site.position
        };

        specs.push(PlacementSpec {
            type_index,
            site: site.position,
            position,
            rotation,
        });
    }

    debug!(
        accepted = specs.len(),
        rejected,
        kept_base,
        "planned placements"
    );
    Ok(specs)
}
