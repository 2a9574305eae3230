//! # Asset Load Barrier
//!
//! **Edge-triggered completion over N independent loads**
//!
//! ## Architecture
//!
//! ```text
//!   load task 0 ──┐   record(0, ..)   ┌──────────────────────────────┐
//!   load task 1 ──┼─────────────────> │ slot[i]: written once        │
//!   load task N ──┘                   │ completed: AtomicUsize       │
//!                                     └──────────────┬───────────────┘
//!                                                    │ completed == expected
//!                                                    ▼ (exactly one caller sees it)
//!                                     continuation() ──> wake waiters
//! ```
//!
//! Every recorded result (success, failure, cancellation) increments the
//! counter exactly once. The caller whose increment reaches `expected` runs
//! the continuation, so it can never run twice and never runs early.
//!
//! The continuation executes on whichever thread recorded the last result.
//! It must not block on its own batch.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::error::{AssetError, AssetResult, LoadError, LoadFailure};
use crate::loader::AssetLoader;

/// Position of a request within its batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub usize);

/// Outcome of a single request.
#[derive(Debug)]
pub enum RequestState<P> {
    /// Still in flight.
    Pending,
    /// Loaded successfully.
    Loaded(P),
    /// Failed; the batch still counts it as resolved.
    Failed(LoadError),
}

/// Payload-free view of a request's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestStatus {
    /// Still in flight.
    Pending = 0,
    /// Loaded successfully.
    Loaded = 1,
    /// Failed or cancelled.
    Failed = 2,
}

impl RequestStatus {
    #[inline]
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Loaded,
            _ => Self::Failed,
        }
    }
}

/// A request taken out of a resolved batch.
#[derive(Debug)]
pub struct AssetRequest<P> {
    /// Position in the batch.
    pub id: RequestId,
    /// Locator that was loaded.
    pub locator: String,
    /// Final state.
    pub state: RequestState<P>,
}

type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// One request slot.
struct Slot<P> {
    locator: String,
    /// Set by the single writer that wins the slot.
    claimed: AtomicBool,
    /// `RequestStatus` as u8, published after `outcome` is written.
    status: AtomicU8,
    outcome: Mutex<Option<Result<P, LoadError>>>,
}

struct BatchInner<P> {
    slots: Box<[Slot<P>]>,
    /// The only datum written by many completions.
    completed: AtomicUsize,
    continuation: Mutex<Option<Continuation>>,
    /// True once the continuation has returned.
    settled: AtomicBool,
    drained: AtomicBool,
    settle_lock: Mutex<()>,
    settle_cv: Condvar,
    settle_notify: Notify,
}

/// A set of load requests with a single completion barrier.
///
/// Cloning shares the same batch.
pub struct LoadBatch<P> {
    inner: Arc<BatchInner<P>>,
}

impl<P> Clone for LoadBatch<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for LoadBatch<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadBatch")
            .field("expected", &self.expected_count())
            .field("completed", &self.completed_count())
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<P: Send + 'static> LoadBatch<P> {
    /// Creates a batch over `locators` with a continuation.
    ///
    /// Results are reported with `record`. An empty batch resolves immediately
    /// and runs the continuation before returning.
    pub fn new<I, S, F>(locators: I, continuation: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() + Send + 'static,
    {
        let slots: Box<[Slot<P>]> = locators
            .into_iter()
            .map(|locator| Slot {
                locator: locator.into(),
                claimed: AtomicBool::new(false),
                status: AtomicU8::new(RequestStatus::Pending as u8),
                outcome: Mutex::new(None),
            })
            .collect();

        let batch = Self {
            inner: Arc::new(BatchInner {
                slots,
                completed: AtomicUsize::new(0),
                continuation: Mutex::new(Some(Box::new(continuation))),
                settled: AtomicBool::new(false),
                drained: AtomicBool::new(false),
                settle_lock: Mutex::new(()),
                settle_cv: Condvar::new(),
                settle_notify: Notify::new(),
            }),
        };

        if batch.inner.slots.is_empty() {
            batch.settle();
        }
        batch
    }

    /// Records the result for request `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for an unknown slot and `AlreadyResolved` if
    /// the slot already holds a result. Neither changes the batch.
    pub fn record(&self, index: usize, result: Result<P, LoadError>) -> AssetResult<()> {
        self.resolve(index, result)
    }

    /// Resolves every still-pending request as `Cancelled`.
    ///
    /// Results arriving afterwards are rejected with `AlreadyResolved`.
    /// Returns how many requests were cancelled.
    pub fn cancel(&self) -> usize {
        let cancelled = (0..self.len())
            .filter(|&index| {
                let locator = self.inner.slots[index].locator.clone();
                self.resolve(index, Err(LoadError::new(locator, LoadFailure::Cancelled)))
                    .is_ok()
            })
            .count();

        if cancelled > 0 {
            tracing::info!(cancelled, expected = self.len(), "load batch cancelled");
        }
        cancelled
    }

    fn resolve(&self, index: usize, result: Result<P, LoadError>) -> AssetResult<()> {
        let len = self.len();
        let slot = self
            .inner
            .slots
            .get(index)
            .ok_or(AssetError::IndexOutOfRange { index, len })?;

        if slot.claimed.swap(true, Ordering::AcqRel) {
            return Err(AssetError::AlreadyResolved { index });
        }

        let status = match &result {
            Ok(_) => RequestStatus::Loaded,
            Err(error) => {
                if error.cause != LoadFailure::Cancelled {
                    tracing::debug!(index, %error, "asset load failed");
                }
                RequestStatus::Failed
            }
        };
        *slot.outcome.lock() = Some(result);
        slot.status.store(status as u8, Ordering::Release);

        let completed = self.inner.completed.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(index, completed, expected = len, "asset request resolved");
        if completed == len {
            self.settle();
        }
        Ok(())
    }

    /// Runs the continuation and releases waiters. Reached exactly once.
    fn settle(&self) {
        tracing::debug!(expected = self.len(), failed = self.failed_count(), "load batch complete");

        let continuation = self.inner.continuation.lock().take();
        if let Some(continuation) = continuation {
            continuation();
        }

        {
            let _guard = self.inner.settle_lock.lock();
            self.inner.settled.store(true, Ordering::Release);
        }
        self.inner.settle_cv.notify_all();
        self.inner.settle_notify.notify_waiters();
    }

    /// Blocks until the continuation has run.
    pub fn wait(&self) {
        if self.is_settled() {
            return;
        }
        let mut guard = self.inner.settle_lock.lock();
        while !self.is_settled() {
            self.inner.settle_cv.wait(&mut guard);
        }
    }

    /// Blocks up to `timeout`. Returns true if the batch settled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_settled() {
            return true;
        }
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.settle_lock.lock();
        while !self.is_settled() {
            if self.inner.settle_cv.wait_until(&mut guard, deadline).timed_out() {
                return self.is_settled();
            }
        }
        true
    }

    /// Suspends until the continuation has run.
    pub async fn settled(&self) {
        loop {
            let notified = self.inner.settle_notify.notified();
            if self.is_settled() {
                return;
            }
            notified.await;
        }
    }

    /// Takes every request out of a complete batch.
    ///
    /// Callable from the continuation itself.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` while requests are pending and `AlreadyDrained`
    /// on a second call.
    pub fn take_requests(&self) -> AssetResult<Vec<AssetRequest<P>>> {
        if !self.is_complete() {
            return Err(AssetError::Incomplete {
                completed: self.completed_count(),
                expected: self.len(),
            });
        }
        if self.inner.drained.swap(true, Ordering::AcqRel) {
            return Err(AssetError::AlreadyDrained);
        }

        Ok(self
            .inner
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| AssetRequest {
                id: RequestId(index),
                locator: slot.locator.clone(),
                state: match slot.outcome.lock().take() {
                    Some(Ok(payload)) => RequestState::Loaded(payload),
                    Some(Err(error)) => RequestState::Failed(error),
                    None => RequestState::Pending,
                },
            })
            .collect())
    }
}

impl<P> LoadBatch<P> {
    /// Number of requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    /// True for a batch with no requests.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Same as `len`.
    #[inline]
    #[must_use]
    pub fn expected_count(&self) -> usize {
        self.len()
    }

    /// Requests resolved so far.
    #[inline]
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// True once every request has resolved.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_count() == self.len()
    }

    /// True once the continuation has returned.
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    /// Locator of request `index`.
    #[must_use]
    pub fn locator(&self, index: usize) -> Option<&str> {
        self.inner.slots.get(index).map(|s| s.locator.as_str())
    }

    /// State of request `index`, without its payload.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<RequestStatus> {
        self.inner
            .slots
            .get(index)
            .map(|s| RequestStatus::from_u8(s.status.load(Ordering::Acquire)))
    }

    /// Number of failed requests so far.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        (0..self.len())
            .filter(|&i| self.status(i) == Some(RequestStatus::Failed))
            .count()
    }
}

/// Spawns one load task per locator and hands back the batch.
pub struct AssetLoadBarrier<L> {
    loader: Arc<L>,
    runtime: Handle,
    timeout: Option<Duration>,
}

impl<L: AssetLoader> AssetLoadBarrier<L> {
    /// Creates a barrier that spawns loads on `runtime`.
    #[must_use]
    pub fn new(loader: Arc<L>, runtime: Handle) -> Self {
        Self {
            loader,
            runtime,
            timeout: None,
        }
    }

    /// Fails any single load that takes longer than `timeout`.
    ///
    /// The runtime must have its time driver enabled.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The shared loader.
    #[must_use]
    pub fn loader(&self) -> &Arc<L> {
        &self.loader
    }

    /// Issues one load per locator; `continuation` runs once all resolve.
    ///
    /// Each load runs in its own task. A loader that panics resolves its
    /// request as `Aborted` instead of stalling the batch (requires
    /// `panic = "unwind"`).
    pub fn begin_batch<I, S, F>(&self, locators: I, continuation: F) -> LoadBatch<L::Payload>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() + Send + 'static,
    {
        let batch = LoadBatch::new(locators, continuation);
        tracing::info!(requests = batch.len(), "load batch started");

        for index in 0..batch.len() {
            let Some(locator) = batch.locator(index).map(str::to_owned) else {
                continue;
            };
            let loader = Arc::clone(&self.loader);
            let batch = batch.clone();
            let timeout = self.timeout;

            self.runtime.spawn(async move {
                let load = {
                    let locator = locator.clone();
                    tokio::spawn(async move {
                        match timeout {
                            Some(limit) => tokio::time::timeout(limit, loader.load(&locator))
                                .await
                                .unwrap_or_else(|_| Err(LoadError::new(locator.clone(), LoadFailure::TimedOut))),
                            None => loader.load(&locator).await,
                        }
                    })
                };
                // A panicking loader still resolves its slot.
                let result = load
                    .await
                    .unwrap_or_else(|join| Err(LoadError::new(locator, LoadFailure::Aborted(join.to_string()))));
                if let Err(error) = batch.record(index, result) {
                    tracing::debug!(index, %error, "late asset result discarded");
                }
            });
        }

        batch
    }
}
