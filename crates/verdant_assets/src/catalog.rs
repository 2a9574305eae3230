//! # Content Catalog
//!
//! A scene draws from a fixed list of content types. Each type has one asset
//! per detail level, named by a simple scheme:
//!
//! ```text
//! {base}{type}_{level}{extension}      e.g. models/2_0.glb
//! ```
//!
//! The catalog flattens every (type, level) pair into one batch, type-major,
//! and regroups the resolved requests afterwards.

use crate::barrier::{AssetRequest, RequestState};
use crate::error::{AssetError, AssetResult, LoadError};

/// Naming scheme for per-level asset files.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocatorScheme {
    /// Prefix, usually a directory with trailing slash.
    pub base: String,
    /// Suffix including the dot.
    pub extension: String,
}

impl LocatorScheme {
    /// Creates a scheme.
    #[must_use]
    pub fn new(base: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: extension.into(),
        }
    }

    /// Locator for `level` of `type_index`.
    #[must_use]
    pub fn locator(&self, type_index: usize, level: usize) -> String {
        format!("{}{type_index}_{level}{}", self.base, self.extension)
    }
}

/// Resolved assets for one content type.
#[derive(Debug)]
pub enum TypeAssets<P> {
    /// Every level loaded, finest first.
    Complete(Vec<P>),
    /// At least one level failed; the type cannot be placed.
    Incomplete(Vec<LoadError>),
}

impl<P> TypeAssets<P> {
    /// True if every level loaded.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Content types and their level counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    scheme: LocatorScheme,
    /// Levels per type.
    levels: Vec<usize>,
    /// First batch index of each type.
    offsets: Vec<usize>,
}

impl Catalog {
    /// Creates a catalog.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCatalog` if there are no types or a type has no levels.
    pub fn new(scheme: LocatorScheme, levels: Vec<usize>) -> AssetResult<Self> {
        if levels.is_empty() {
            return Err(AssetError::InvalidCatalog("no content types".to_string()));
        }
        if let Some(type_index) = levels.iter().position(|&n| n == 0) {
            return Err(AssetError::InvalidCatalog(format!("type {type_index} has no levels")));
        }

        let offsets = levels
            .iter()
            .scan(0, |next, &n| {
                let start = *next;
                *next += n;
                Some(start)
            })
            .collect();

        Ok(Self {
            scheme,
            levels,
            offsets,
        })
    }

    /// Locator scheme.
    #[must_use]
    pub fn scheme(&self) -> &LocatorScheme {
        &self.scheme
    }

    /// Number of content types.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.levels.len()
    }

    /// Levels of `type_index`.
    #[inline]
    #[must_use]
    pub fn levels(&self, type_index: usize) -> Option<usize> {
        self.levels.get(type_index).copied()
    }

    /// Total assets across all types.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.levels.iter().sum()
    }

    /// Every locator in batch order (type-major, finest level first).
    #[must_use]
    pub fn locators(&self) -> Vec<String> {
        self.levels
            .iter()
            .enumerate()
            .flat_map(|(t, &n)| (0..n).map(move |level| (t, level)))
            .map(|(t, level)| self.scheme.locator(t, level))
            .collect()
    }

    /// Batch index of `(type_index, level)`.
    #[must_use]
    pub fn slot(&self, type_index: usize, level: usize) -> Option<usize> {
        let levels = *self.levels.get(type_index)?;
        (level < levels).then(|| self.offsets[type_index] + level)
    }

    /// Regroups a drained batch by content type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCatalog` if `requests` was not built from this catalog.
    pub fn group<P>(&self, requests: Vec<AssetRequest<P>>) -> AssetResult<Vec<TypeAssets<P>>> {
        if requests.len() != self.asset_count() {
            return Err(AssetError::InvalidCatalog(format!(
                "{} requests for {} catalog assets",
                requests.len(),
                self.asset_count()
            )));
        }

        let mut requests = requests.into_iter();
        let mut grouped = Vec::with_capacity(self.type_count());
        for &n in &self.levels {
            let mut payloads = Vec::with_capacity(n);
            let mut failures = Vec::new();
            for request in requests.by_ref().take(n) {
                match request.state {
                    RequestState::Loaded(payload) => payloads.push(payload),
                    RequestState::Failed(error) => failures.push(error),
                    RequestState::Pending => {
                        return Err(AssetError::InvalidCatalog(format!(
                            "request `{}` still pending",
                            request.locator
                        )))
                    }
                }
            }
            grouped.push(if failures.is_empty() {
                TypeAssets::Complete(payloads)
            } else {
                TypeAssets::Incomplete(failures)
            });
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::RequestId;
    use crate::error::LoadFailure;

    fn catalog() -> Catalog {
        Catalog::new(LocatorScheme::new("models/", ".glb"), vec![2, 1, 3]).unwrap()
    }

    #[test]
    fn test_locator_scheme() {
        let scheme = LocatorScheme::new("models/", ".glb");
        assert_eq!(scheme.locator(2, 0), "models/2_0.glb");
    }

    #[test]
    fn test_locators_type_major() {
        let c = catalog();
        assert_eq!(c.asset_count(), 6);
        assert_eq!(
            c.locators(),
            vec![
                "models/0_0.glb",
                "models/0_1.glb",
                "models/1_0.glb",
                "models/2_0.glb",
                "models/2_1.glb",
                "models/2_2.glb",
            ]
        );
        assert_eq!(c.slot(2, 1), Some(4));
        assert_eq!(c.slot(1, 1), None);
        assert_eq!(c.slot(9, 0), None);
    }

    #[test]
    fn test_rejects_empty() {
        let scheme = LocatorScheme::new("", "");
        assert!(Catalog::new(scheme.clone(), vec![]).is_err());
        assert!(Catalog::new(scheme, vec![1, 0]).is_err());
    }

    #[test]
    fn test_group_marks_failed_types() {
        let c = catalog();
        let requests = c
            .locators()
            .into_iter()
            .enumerate()
            .map(|(i, locator)| AssetRequest {
                id: RequestId(i),
                state: if i == 3 {
                    RequestState::Failed(LoadError::new(locator.clone(), LoadFailure::TimedOut))
                } else {
                    RequestState::Loaded(i)
                },
                locator,
            })
            .collect();

        let grouped = c.group(requests).unwrap();
        assert!(matches!(&grouped[0], TypeAssets::Complete(p) if p == &vec![0, 1]));
        assert!(matches!(&grouped[1], TypeAssets::Complete(p) if p == &vec![2]));
        assert!(matches!(&grouped[2], TypeAssets::Incomplete(e) if e.len() == 1));
        assert!(!grouped[2].is_complete());
    }

    #[test]
    fn test_group_length_mismatch() {
        let c = catalog();
        assert!(c.group::<u8>(Vec::new()).is_err());
    }
}
