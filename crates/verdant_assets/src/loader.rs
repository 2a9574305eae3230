//! # Asset Loaders
//!
//! The host decides what "loading" means. The barrier only needs a future
//! per locator that resolves to a payload or a `LoadError`.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use crate::error::{LoadError, LoadFailure};

/// Host-supplied "load a named asset".
///
/// Implementations must be cheap to share; the barrier holds one in an `Arc`
/// and calls `load` from spawned tasks.
pub trait AssetLoader: Send + Sync + 'static {
    /// Loaded content handed back to the caller.
    type Payload: Send + 'static;

    /// Loads the asset at `locator`.
    fn load(&self, locator: &str) -> impl Future<Output = Result<Self::Payload, LoadError>> + Send;
}

/// Reads raw asset bytes from a directory.
#[derive(Clone, Debug)]
pub struct FileAssetLoader {
    /// Directory locators are resolved against.
    root: PathBuf,
}

impl FileAssetLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a locator, refusing absolute paths and `..`.
    fn resolve(&self, locator: &str) -> Option<PathBuf> {
        let relative = Path::new(locator);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        (plain && !locator.is_empty()).then(|| self.root.join(relative))
    }
}

impl AssetLoader for FileAssetLoader {
    type Payload = Vec<u8>;

    fn load(&self, locator: &str) -> impl Future<Output = Result<Vec<u8>, LoadError>> + Send {
        let path = self.resolve(locator);
        let locator = locator.to_owned();
        async move {
            let Some(path) = path else {
                return Err(LoadError::new(locator, LoadFailure::InvalidLocator));
            };
            tokio::fs::read(&path)
                .await
                .map_err(|e| LoadError::from_io(locator, &e))
        }
    }
}
