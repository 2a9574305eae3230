//! # Asset Error Types
//!
//! `LoadError` is per-request data recorded into a batch. `AssetError` is a
//! misuse of the barrier or catalog and is returned to the caller.

use thiserror::Error;

/// Why a single asset failed to load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Nothing exists at the locator.
    #[error("not found")]
    NotFound,
    /// The read failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// Bytes arrived but could not be turned into content.
    #[error("decode error: {0}")]
    Decode(String),
    /// Locator escapes the loader's root or is otherwise unusable.
    #[error("invalid locator")]
    InvalidLocator,
    /// The load exceeded the barrier's timeout.
    #[error("timed out")]
    TimedOut,
    /// The batch was cancelled before this load resolved.
    #[error("cancelled")]
    Cancelled,
    /// The loader panicked or its task was aborted.
    #[error("loader aborted: {0}")]
    Aborted(String),
}

/// Per-asset failure, carrying the locator and cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load `{locator}`: {cause}")]
pub struct LoadError {
    /// Locator that was requested.
    pub locator: String,
    /// What went wrong.
    pub cause: LoadFailure,
}

impl LoadError {
    /// Creates a load error.
    #[must_use]
    pub fn new(locator: impl Into<String>, cause: LoadFailure) -> Self {
        Self {
            locator: locator.into(),
            cause,
        }
    }

    /// Maps an I/O error, keeping `NotFound` distinct.
    #[must_use]
    pub fn from_io(locator: impl Into<String>, error: &std::io::Error) -> Self {
        let cause = match error.kind() {
            std::io::ErrorKind::NotFound => LoadFailure::NotFound,
            _ => LoadFailure::Io(error.to_string()),
        };
        Self::new(locator, cause)
    }
}

/// Errors from driving a batch or building a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Result reported for a slot that doesn't exist.
    #[error("request index {index} out of range (batch of {len})")]
    IndexOutOfRange {
        /// Reported index.
        index: usize,
        /// Batch size.
        len: usize,
    },

    /// A second result arrived for an already-resolved slot.
    #[error("request {index} already resolved")]
    AlreadyResolved {
        /// Slot index.
        index: usize,
    },

    /// Payloads requested before every slot resolved.
    #[error("batch incomplete: {completed} of {expected} resolved")]
    Incomplete {
        /// Slots resolved so far.
        completed: usize,
        /// Slots in the batch.
        expected: usize,
    },

    /// Payloads were already taken out of this batch.
    #[error("batch payloads already taken")]
    AlreadyDrained,

    /// Catalog or request list does not line up.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Result type for barrier and catalog operations.
pub type AssetResult<T> = Result<T, AssetError>;
