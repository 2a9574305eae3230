//! # Load Barrier Tests
//!
//! Arrival order, concurrent completion and the async loader path.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use verdant_assets::{
    AssetLoadBarrier, AssetLoader, LoadBatch, LoadError, LoadFailure, RequestState, RequestStatus,
};

/// Loader with per-locator latency and failure.
struct ScriptedLoader {
    delays_ms: HashMap<String, u64>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedLoader {
    fn new(delays: &[(&str, u64)], failing: &[&str]) -> Self {
        Self {
            delays_ms: delays.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            failing: failing.iter().map(|s| (*s).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl AssetLoader for ScriptedLoader {
    type Payload = String;

    fn load(&self, locator: &str) -> impl Future<Output = Result<String, LoadError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays_ms.get(locator).copied().unwrap_or(0);
        let fails = self.failing.iter().any(|f| f == locator);
        let locator = locator.to_owned();
        async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if fails {
                Err(LoadError::new(locator, LoadFailure::Io("disk on fire".into())))
            } else {
                Ok(format!("mesh:{locator}"))
            }
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

/// All permutations of 0..n.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for perm in permutations(n - 1) {
        for pos in 0..=perm.len() {
            let mut p = perm.clone();
            p.insert(pos, n - 1);
            out.push(p);
        }
    }
    out
}

/// Test: Any arrival order, with interleaved failures, fires exactly once and last.
#[test]
fn test_every_arrival_order_fires_once() {
    let locators = ["a", "b", "c", "d", "e"];

    for (round, order) in permutations(locators.len()).into_iter().enumerate() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let batch: LoadBatch<usize> = LoadBatch::new(locators, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for (step, &index) in order.iter().enumerate() {
            assert_eq!(fired.load(Ordering::SeqCst), 0, "fired early in round {round}");
            let result = if (index + round) % 3 == 0 {
                Err(LoadError::new(locators[index], LoadFailure::NotFound))
            } else {
                Ok(index)
            };
            batch.record(index, result).unwrap();
            assert_eq!(batch.completed_count(), step + 1);
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1, "round {round}");
        assert!(batch.is_settled());
    }
}

/// Test: Completions racing from many threads lose no updates.
#[test]
fn test_concurrent_records_from_threads() {
    const REQUESTS: usize = 256;

    for _ in 0..20 {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let locators: Vec<String> = (0..REQUESTS).map(|i| format!("asset_{i}")).collect();
        let batch: LoadBatch<usize> = LoadBatch::new(locators, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let batch = batch.clone();
                thread::spawn(move || {
                    for index in (t..REQUESTS).step_by(8) {
                        batch.record(index, Ok(index)).unwrap();
                    }
                })
            })
            .collect();

        batch.wait();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(batch.completed_count(), REQUESTS);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

/// Test: "b" fails, "a" and "c" load; continuation runs once.
#[test]
fn test_partial_failure_scenario() {
    let rt = runtime();
    let loader = Arc::new(ScriptedLoader::new(&[("a", 30), ("b", 5), ("c", 15)], &["b"]));
    let barrier = AssetLoadBarrier::new(Arc::clone(&loader), rt.handle().clone());

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let batch = barrier.begin_batch(["a", "b", "c"], move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(batch.wait_timeout(Duration::from_secs(5)));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 3);

    assert_eq!(batch.status(0), Some(RequestStatus::Loaded));
    assert_eq!(batch.status(1), Some(RequestStatus::Failed));
    assert_eq!(batch.status(2), Some(RequestStatus::Loaded));

    let requests = batch.take_requests().unwrap();
    assert!(matches!(&requests[0].state, RequestState::Loaded(m) if m == "mesh:a"));
    assert!(matches!(&requests[1].state, RequestState::Failed(e) if e.locator == "b"));
}

/// Test: Slow loads resolve as timed out instead of blocking forever.
#[test]
fn test_timeout_counts_as_failure() {
    let rt = runtime();
    let loader = Arc::new(ScriptedLoader::new(&[("slow", 10_000)], &[]));
    let barrier =
        AssetLoadBarrier::new(loader, rt.handle().clone()).with_timeout(Duration::from_millis(50));

    let batch = barrier.begin_batch(["fast", "slow"], || {});
    assert!(batch.wait_timeout(Duration::from_secs(5)));

    let requests = batch.take_requests().unwrap();
    assert!(matches!(requests[0].state, RequestState::Loaded(_)));
    assert!(matches!(&requests[1].state, RequestState::Failed(e) if e.cause == LoadFailure::TimedOut));
}

/// Test: Cancelling mid-flight settles the batch and discards late results.
#[test]
fn test_cancel_mid_flight() {
    let rt = runtime();
    let loader = Arc::new(ScriptedLoader::new(&[("x", 200), ("y", 200)], &[]));
    let barrier = AssetLoadBarrier::new(loader, rt.handle().clone());

    let batch = barrier.begin_batch(["x", "y"], || {});
    assert_eq!(batch.cancel(), 2);
    assert!(batch.is_settled());

    // Let the real loads land on the cancelled slots.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(batch.completed_count(), 2);
    assert_eq!(batch.failed_count(), 2);
}

/// Test: The async wait resumes after the continuation.
#[test]
fn test_async_settled() {
    let rt = runtime();
    let loader = Arc::new(ScriptedLoader::new(&[("p", 20), ("q", 40)], &[]));
    let barrier = AssetLoadBarrier::new(loader, rt.handle().clone());

    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let log = Arc::clone(&order);
    let batch = barrier.begin_batch(["p", "q"], move || log.lock().push("continuation"));

    rt.block_on(async {
        batch.settled().await;
        order.lock().push("resumed");
    });

    assert_eq!(*order.lock(), vec!["continuation", "resumed"]);
}

/// Loader that panics on one locator, either while building the future or inside it.
struct PanickingLoader {
    eager: bool,
}

impl AssetLoader for PanickingLoader {
    type Payload = String;

    fn load(&self, locator: &str) -> impl Future<Output = Result<String, LoadError>> + Send {
        let locator = locator.to_owned();
        assert!(!(self.eager && locator == "b"), "loader blew up building {locator}");
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_ne!(locator, "b", "loader blew up loading {locator}");
            Ok(format!("mesh:{locator}"))
        }
    }
}

/// Test: A panicking loader still resolves its slot; the batch settles.
#[test]
fn test_panicking_loader_settles_batch() {
    let rt = runtime();
    for eager in [false, true] {
        let barrier = AssetLoadBarrier::new(Arc::new(PanickingLoader { eager }), rt.handle().clone());

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let batch = barrier.begin_batch(["a", "b", "c"], move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(batch.wait_timeout(Duration::from_secs(5)), "eager={eager}");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(batch.completed_count(), 3);
        assert_eq!(batch.failed_count(), 1);

        let requests = batch.take_requests().unwrap();
        assert!(matches!(requests[0].state, RequestState::Loaded(_)));
        assert!(matches!(
            &requests[1].state,
            RequestState::Failed(e) if e.locator == "b" && matches!(e.cause, LoadFailure::Aborted(_))
        ));
        assert!(matches!(requests[2].state, RequestState::Loaded(_)));
    }
}
