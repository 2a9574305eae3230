//! # Scatter Error Types
//!
//! Two families, both returned synchronously and never retried:
//! invalid input (bad planner arguments) and invalid configuration
//! (bad detail tiers or templates).

use thiserror::Error;

/// Errors that can occur while planning or composing placements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScatterError {
    /// Spacing must be positive and finite.
    #[error("invalid spacing: {0}")]
    InvalidSpacing(f32),

    /// At least one content type is required.
    #[error("type count must be positive")]
    InvalidTypeCount,

    /// Region shape is degenerate or non-finite.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Exclusion rectangle is inverted or non-finite.
    #[error("invalid exclusion zone {index}")]
    InvalidExclusion {
        /// Position in the exclusion list.
        index: usize,
    },

    /// Grid would produce more candidate sites than the planner accepts.
    #[error("{sites} candidate sites exceeds limit of {limit}")]
    TooManySites {
        /// Sites the grid would enumerate.
        sites: u64,
        /// Upper bound.
        limit: u64,
    },

    /// A detail tier set needs at least one variant.
    #[error("detail tier set is empty")]
    EmptyTierSet,

    /// Activation distance is negative or non-finite.
    #[error("variant {index} has invalid activation distance {distance}")]
    InvalidDistance {
        /// Variant position.
        index: usize,
        /// Offending distance.
        distance: f32,
    },

    /// Activation distances must strictly increase.
    #[error("variant {index} distance {current} does not exceed previous {previous}")]
    NonAscending {
        /// Variant position.
        index: usize,
        /// Distance of the variant before it.
        previous: f32,
        /// Its own distance.
        current: f32,
    },

    /// The finest tier must activate at distance 0.
    #[error("no zero-distance fallback (first tier activates at {0})")]
    MissingFallback(f32),

    /// Hysteresis band is negative or non-finite.
    #[error("invalid hysteresis band: {0}")]
    InvalidBand(f32),

    /// Template library and placement plan disagree on type count.
    #[error("plan uses {planned} content types, library has {available}")]
    TypeCountMismatch {
        /// Types the plan was drawn over.
        planned: usize,
        /// Types in the library.
        available: usize,
    },
}

impl ScatterError {
    /// True for bad planner arguments.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpacing(_)
                | Self::InvalidTypeCount
                | Self::InvalidRegion(_)
                | Self::InvalidExclusion { .. }
                | Self::TooManySites { .. }
        )
    }

    /// True for bad detail tiers, hysteresis or template setup.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        !self.is_invalid_input()
    }
}

/// Result type for scatter operations.
pub type ScatterResult<T> = Result<T, ScatterError>;
