//! # Placement Regions
//!
//! Ground-plane shapes. Points are `[x, y]`; elevation is added later.
//!
//! ```text
//!   Circle: |p - center| <  radius     (boundary excluded)
//!   Rect:   min <= p <= max            (boundary included)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ScatterError, ScatterResult};

/// Axis-aligned rectangle on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Lower corner.
    pub min: [f32; 2],
    /// Upper corner.
    pub max: [f32; 2],
}

impl Rect {
    /// Creates a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    /// Inclusive containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: [f32; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    /// Width and height.
    #[inline]
    #[must_use]
    pub fn size(&self) -> [f32; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Finite with `min <= max` on both axes.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min.iter().chain(&self.max).all(|v| v.is_finite())
            && self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1]
    }
}

/// Shape sites must fall inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Region {
    /// Open disc.
    Circle {
        /// Centre point.
        center: [f32; 2],
        /// Radius, positive.
        radius: f32,
    },
    /// Closed rectangle.
    Rect {
        /// Lower corner.
        min: [f32; 2],
        /// Upper corner.
        max: [f32; 2],
    },
}

impl Region {
    /// Disc shorthand.
    #[inline]
    #[must_use]
    pub const fn circle(center: [f32; 2], radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Rectangle shorthand.
    #[inline]
    #[must_use]
    pub const fn rect(min: [f32; 2], max: [f32; 2]) -> Self {
        Self::Rect { min, max }
    }

    /// Tight axis-aligned bounds.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        match *self {
            Self::Circle { center, radius } => Rect::new(
                [center[0] - radius, center[1] - radius],
                [center[0] + radius, center[1] + radius],
            ),
            Self::Rect { min, max } => Rect::new(min, max),
        }
    }

    /// Membership test.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: [f32; 2]) -> bool {
        match *self {
            Self::Circle { center, radius } => {
                let dx = p[0] - center[0];
                let dy = p[1] - center[1];
                dx * dx + dy * dy < radius * radius
            }
            Self::Rect { min, max } => Rect::new(min, max).contains(p),
        }
    }

    /// Rejects degenerate and non-finite shapes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegion` describing the problem.
    pub fn validate(&self) -> ScatterResult<()> {
        match *self {
            Self::Circle { center, radius } => {
                if !center.iter().all(|v| v.is_finite()) {
                    return Err(ScatterError::InvalidRegion("circle center not finite".into()));
                }
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(ScatterError::InvalidRegion(format!("circle radius {radius}")));
                }
            }
            Self::Rect { min, max } => {
                if !Rect::new(min, max).is_well_formed() {
                    return Err(ScatterError::InvalidRegion(format!(
                        "rect {min:?}..{max:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}
