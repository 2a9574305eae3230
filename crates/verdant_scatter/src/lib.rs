//! # VERDANT Scatter
//!
//! Deterministic, constraint-respecting placement of cloned content with
//! distance-tiered detail.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and inputs produce the same placements
//! 2. **Synchronous**: No I/O, no suspension; templates arrive fully loaded
//! 3. **Independent copies**: Placed content never aliases its template
//!
//! ## Core Components
//!
//! - `RandomSource` / `SeededRandom`: Seedable uniform draws (ChaCha8)
//! - `Region`, `Rect`: Placement bounds and exclusion zones
//! - `plan`: Grid sites to `PlacementSpec`s
//! - `DetailTierSet`: Distance-ordered variants and `select`
//! - `TemplateLibrary` / `compose`: Placements to `PlacementInstance`s
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_scatter::{plan, PlacementRequest, Rect, Region, SeededRandom};
//!
//! let request = PlacementRequest::new(Region::circle([0.0, 0.0], 30.0), 3.0, 4)
//!     .with_exclusions(vec![Rect::new([-3.0, -2.0], [3.0, 2.0])]);
//! let specs = plan(&request, &mut SeededRandom::new(42))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod compose;
pub mod detail;
pub mod error;
pub mod planner;
pub mod random;
pub mod region;

pub use compose::{compose, Composition, PlacementInstance, Template, TemplateLibrary};
pub use detail::{DetailTierSet, DetailVariant, TierTracker};
pub use error::{ScatterError, ScatterResult};
pub use planner::{enumerate_sites, plan, PlacementRequest, PlacementSite, PlacementSpec, Rotation};
pub use random::{PlacementSeed, RandomSource, SeededRandom};
pub use region::{Rect, Region};
