//! # VERDANT Assets
//!
//! Coordinates many independent, variable-latency asset loads into one
//! completion barrier.
//!
//! ## Design Principles
//!
//! 1. **Edge-triggered**: The continuation runs on the transition to
//!    "all resolved", never from a polling loop
//! 2. **Single writer**: Each request slot is written exactly once
//! 3. **Failures count**: A failed load still resolves its slot
//!
//! ## Core Components
//!
//! - `AssetLoader`: Host-supplied async loader
//! - `LoadBatch`: Per-batch slots, atomic counter and continuation
//! - `AssetLoadBarrier`: Spawns one task per locator on a tokio runtime
//! - `Catalog`: Maps content types and levels to locators
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_assets::{AssetLoadBarrier, FileAssetLoader};
//!
//! let barrier = AssetLoadBarrier::new(Arc::new(FileAssetLoader::new("assets")), runtime.handle().clone());
//! let batch = barrier.begin_batch(["tree_0.glb", "tree_1.glb"], || tracing::info!("templates ready"));
//! batch.wait();
//!
//! for request in batch.take_requests()? {
//!     // inspect request.state
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod barrier;
pub mod catalog;
pub mod error;
pub mod loader;

pub use barrier::{AssetLoadBarrier, AssetRequest, LoadBatch, RequestId, RequestState, RequestStatus};
pub use catalog::{Catalog, LocatorScheme, TypeAssets};
pub use error::{AssetError, AssetResult, LoadError, LoadFailure};
pub use loader::{AssetLoader, FileAssetLoader};
