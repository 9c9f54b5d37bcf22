use crate::data::SourceSnapshot;
use crate::errors::ReportError;
use crate::source::DataSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Time-bounded memoization of a source's last successful snapshot.
///
/// Readers inside the freshness window share one `Arc<SourceSnapshot>`. Refreshes
/// are serialized, so concurrent callers that find the snapshot stale trigger a
/// single load and then all observe its result. A snapshot is swapped in whole
/// or not at all; a failed load leaves the previous snapshot in place.
pub struct SnapshotCache<S: DataSource> {
    source: S,
    ttl: Duration,
    state: RwLock<Option<CachedSnapshot>>,
    refresh_gate: Mutex<()>,
    loads: AtomicU64,
}

/// Internal cache entry plus the instant it was stored.
struct CachedSnapshot {
    snapshot: Arc<SourceSnapshot>,
    stored_at: Instant,
    invalidated: bool,
}

/// Outcome of asking the cache for the current snapshot.
#[derive(Debug)]
pub enum Refresh {
    /// The cached snapshot was still fresh.
    Cached(Arc<SourceSnapshot>),
    /// A new snapshot was loaded and cached.
    Loaded(Arc<SourceSnapshot>),
    /// Loading failed; `previous` is the snapshot that stays displayed, if any.
    Failed {
        /// Why the load failed.
        error: ReportError,
        /// Last good snapshot.
        previous: Option<Arc<SourceSnapshot>>,
    },
}

impl Refresh {
    /// Snapshot to display for this refresh cycle, if any.
    pub fn snapshot(&self) -> Option<&Arc<SourceSnapshot>> {
        match self {
            Refresh::Cached(snapshot) | Refresh::Loaded(snapshot) => Some(snapshot),
            Refresh::Failed { previous, .. } => previous.as_ref(),
        }
    }

    /// Load error raised during this refresh cycle, if any.
    pub fn error(&self) -> Option<&ReportError> {
        match self {
            Refresh::Failed { error, .. } => Some(error),
            Refresh::Cached(_) | Refresh::Loaded(_) => None,
        }
    }
}

impl<S: DataSource> SnapshotCache<S> {
    /// Create an empty cache around `source` whose snapshots stay fresh for `ttl`.
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            loads: AtomicU64::new(0),
        }
    }

    /// Source wrapped by this cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the fresh cached snapshot, loading a new one when stale or empty.
    pub fn current(&self) -> Refresh {
        if let Some(snapshot) = self.fresh_snapshot() {
            return Refresh::Cached(snapshot);
        }
        let _gate = self.refresh_gate.lock().expect("snapshot refresh gate poisoned");
        // Another caller may have refreshed while this one waited on the gate.
        if let Some(snapshot) = self.fresh_snapshot() {
            return Refresh::Cached(snapshot);
        }
        self.loads.fetch_add(1, Ordering::Relaxed);
        match self.source.load() {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let mut state = self.state.write().expect("snapshot cache poisoned");
                *state = Some(CachedSnapshot {
                    snapshot: Arc::clone(&snapshot),
                    stored_at: Instant::now(),
                    invalidated: false,
                });
                debug!(
                    "[aging_report:cache] stored snapshot source='{}' rows={}",
                    snapshot.source_id,
                    snapshot.records.len()
                );
                Refresh::Loaded(snapshot)
            }
            Err(error) => {
                let previous = self.snapshot();
                warn!(
                    "[aging_report:cache] refresh of '{}' failed (previous kept: {}): {error}",
                    self.source.id(),
                    previous.is_some()
                );
                Refresh::Failed { error, previous }
            }
        }
    }

    /// Last stored snapshot regardless of freshness.
    pub fn snapshot(&self) -> Option<Arc<SourceSnapshot>> {
        let state = self.state.read().expect("snapshot cache poisoned");
        state.as_ref().map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Mark the stored snapshot stale so the next `current` call reloads.
    ///
    /// The snapshot itself is kept as the fallback for a failed reload.
    pub fn invalidate(&self) {
        let mut state = self.state.write().expect("snapshot cache poisoned");
        if let Some(entry) = state.as_mut() {
            entry.invalidated = true;
        }
    }

    /// Number of source loads attempted so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn fresh_snapshot(&self) -> Option<Arc<SourceSnapshot>> {
        let state = self.state.read().expect("snapshot cache poisoned");
        state
            .as_ref()
            .filter(|entry| !entry.invalidated && entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::source::InMemorySource;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    /// Source that fails on demand and counts loads.
    struct FlakySource {
        fail: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl FlakySource {
        fn new() -> Self {
            Self {
                fail: Mutex::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn set_failing(&self, failing: bool) {
            *self.fail.lock().unwrap() = failing;
        }
    }

    impl DataSource for FlakySource {
        fn id(&self) -> &str {
            "flaky"
        }

        fn load(&self) -> Result<SourceSnapshot, ReportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(ReportError::SourceUnavailable {
                    source_id: "flaky".into(),
                    reason: "offline".into(),
                });
            }
            Ok(SourceSnapshot {
                source_id: "flaky".into(),
                records: vec![Record {
                    client: format!("client_{call}"),
                    ..Record::default()
                }],
                unparsed_dates: 0,
                fetched_at: Utc::now(),
            })
        }
    }

    #[test]
    fn fresh_snapshot_is_shared_without_reloading() {
        let cache = SnapshotCache::new(
            InMemorySource::new("mem", vec![Record::default()]),
            Duration::from_secs(3600),
        );
        let first = cache.current();
        let second = cache.current();
        assert!(matches!(first, Refresh::Loaded(_)));
        assert!(matches!(second, Refresh::Cached(_)));
        assert!(Arc::ptr_eq(
            first.snapshot().unwrap(),
            second.snapshot().unwrap()
        ));
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn stale_snapshot_triggers_reload() {
        let cache = SnapshotCache::new(FlakySource::new(), Duration::ZERO);
        let first = cache.current();
        let second = cache.current();
        assert!(matches!(second, Refresh::Loaded(_)));
        assert_eq!(first.snapshot().unwrap().records[0].client, "client_0");
        assert_eq!(second.snapshot().unwrap().records[0].client, "client_1");
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let cache = SnapshotCache::new(FlakySource::new(), Duration::from_secs(3600));
        let loaded = cache.current();
        cache.source().set_failing(true);
        cache.invalidate();

        let failed = cache.current();
        assert!(failed.error().is_some_and(ReportError::is_load_error));
        assert!(Arc::ptr_eq(
            loaded.snapshot().unwrap(),
            failed.snapshot().unwrap()
        ));
        assert_eq!(cache.snapshot().unwrap().records[0].client, "client_0");
    }

    #[test]
    fn failed_first_load_has_no_snapshot() {
        let source = FlakySource::new();
        source.set_failing(true);
        let cache = SnapshotCache::new(source, Duration::from_secs(3600));
        let refresh = cache.current();
        assert!(refresh.snapshot().is_none());
        assert!(refresh.error().is_some());
        // Failures are not cached; the next call tries again.
        cache.source().set_failing(false);
        assert!(matches!(cache.current(), Refresh::Loaded(_)));
    }

    #[test]
    fn concurrent_callers_observe_one_load() {
        let cache = Arc::new(SnapshotCache::new(
            FlakySource::new(),
            Duration::from_secs(3600),
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache.current().snapshot().unwrap().records[0].client.clone()
                })
            })
            .collect();
        let clients: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(clients.iter().all(|client| client == "client_0"));
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
    }
}
