//! In-memory fetch cache fronting every outbound provider call
//!
//! A `FetchCache` serves time-windowed cached values, collapses concurrent
//! requests for the same logical key into a single producer invocation, and
//! falls back to the last good value when a refresh fails.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

/// A fetch that callers can await together
type PendingFetch<T, E> = Shared<BoxFuture<'static, Result<Arc<T>, E>>>;

/// Last successfully fetched value for a key
struct CacheEntry<T> {
    data: Arc<T>,
    fetched_at: Instant,
}

struct CacheState<T, E> {
    entries: HashMap<String, CacheEntry<T>>,
    in_flight: HashMap<String, PendingFetch<T, E>>,
    /// Bumped by `invalidate_all`; fetches started under an older generation
    /// settle without touching the maps.
    generation: u64,
}

/// Outcome of the synchronous lookup step of `resolve`
enum Lookup<T, E> {
    Fresh(Arc<T>),
    Pending(PendingFetch<T, E>),
}

/// Memoize-with-TTL cache with request coalescing
///
/// Values are handed out as `Arc<T>`, so repeat reads of a fresh entry return
/// the same allocation. Cloning the cache is cheap and every clone shares the
/// same state.
pub struct FetchCache<T, E> {
    state: Arc<Mutex<CacheState<T, E>>>,
}

impl<T, E> Clone for FetchCache<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T, E> Default for FetchCache<T, E> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                generation: 0,
            })),
        }
    }
}

impl<T, E> std::fmt::Debug for FetchCache<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FetchCache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl<T, E> FetchCache<T, E> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<T, E>> {
        lock_state(&self.state)
    }

    /// Clears every cache entry and in-flight marker
    ///
    /// Fetches that are still running keep serving the callers already
    /// awaiting them, but their results are not stored.
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.generation = state.generation.wrapping_add(1);
        debug!("fetch cache invalidated");
    }

    /// When the entry for `key` was last successfully fetched
    pub fn fetched_at(&self, key: &str) -> Option<Instant> {
        self.lock().entries.get(key).map(|entry| entry.fetched_at)
    }

    /// Whether a fetch for `key` is currently outstanding
    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Number of keys holding a cached value
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, E> FetchCache<T, E>
where
    T: Send + Sync + 'static,
    E: Clone + Display + Send + Sync + 'static,
{
    /// Returns the most appropriate value for `key`
    ///
    /// # Arguments
    /// * `key` - Logical request key (e.g. "rates_USD")
    /// * `producer` - Starts the underlying fetch; only invoked when no fresh
    ///   entry and no in-flight fetch exist for `key`
    /// * `freshness` - Maximum age at which a cached entry is served as-is
    ///
    /// # Returns
    /// * `Ok(Arc<T>)` - Fresh cached data, the result of the (possibly shared)
    ///   fetch, or the previous entry if that fetch failed
    /// * `Err(E)` - The fetch failed and nothing was cached for `key`
    pub async fn resolve<F, Fut>(
        &self,
        key: &str,
        producer: F,
        freshness: Duration,
    ) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        match self.lookup_or_start(key, producer, freshness) {
            Lookup::Fresh(data) => Ok(data),
            Lookup::Pending(pending) => pending.await,
        }
    }

    /// Check-then-register step, done under a single lock acquisition
    fn lookup_or_start<F, Fut>(&self, key: &str, producer: F, freshness: Duration) -> Lookup<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut state = self.lock();

        if let Some(entry) = state.entries.get(key) {
            if entry.fetched_at.elapsed() < freshness {
                debug!(key, "cache hit");
                return Lookup::Fresh(Arc::clone(&entry.data));
            }
        }

        if let Some(pending) = state.in_flight.get(key) {
            debug!(key, "joining in-flight fetch");
            return Lookup::Pending(pending.clone());
        }

        debug!(key, "starting fetch");
        let pending = settle(
            Arc::clone(&self.state),
            key.to_string(),
            state.generation,
            producer(),
        )
        .boxed()
        .shared();
        state.in_flight.insert(key.to_string(), pending.clone());
        Lookup::Pending(pending)
    }
}

fn lock_state<T, E>(state: &Mutex<CacheState<T, E>>) -> MutexGuard<'_, CacheState<T, E>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Awaits the fetch, then records its outcome for `key`
async fn settle<T, E, Fut>(
    shared_state: Arc<Mutex<CacheState<T, E>>>,
    key: String,
    generation: u64,
    fetch: Fut,
) -> Result<Arc<T>, E>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    let outcome = fetch.await;

    let mut state = lock_state(&shared_state);
    let current = state.generation == generation;
    if current {
        state.in_flight.remove(&key);
    }

    match outcome {
        Ok(data) => {
            let data = Arc::new(data);
            if current {
                state.entries.insert(
                    key,
                    CacheEntry {
                        data: Arc::clone(&data),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Ok(data)
        }
        Err(err) => match state.entries.get(&key) {
            Some(previous) if current => {
                warn!(key = %key, error = %err, "fetch failed, serving stale cache entry");
                Ok(Arc::clone(&previous.data))
            }
            _ => {
                debug!(key = %key, error = %err, "fetch failed with nothing cached");
                Err(err)
            }
        },
    }
}
