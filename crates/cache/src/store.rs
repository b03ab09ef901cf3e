use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use time::Duration;
use tracing::{debug, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::error::ErrorKind;

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Shared, TTL-bounded key/value table.
///
/// Expiry is lazy: an entry past its TTL is a miss on read and is removed at
/// that point. [`purge_expired`](Self::purge_expired) sweeps everything at
/// once for callers that care about memory.
///
/// [`get_or_fetch`](Self::get_or_fetch) guarantees at most one fetch in flight
/// per key. Fetches run on their own task, so a caller that gives up waiting
/// does not cancel the fetch: its outcome still lands in the table for
/// whoever asks next. Failed fetches record nothing.
///
/// Clones are cheap and share the same table.
pub struct CacheStore<T, E> {
    inner: Arc<Inner<T, E>>,
}

struct Inner<T, E> {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    flights: Mutex<HashMap<String, Flight<T, E>>>,
}
impl<T, E> Inner<T, E> {
    // A panic while holding either lock cannot leave a map half-updated, so
    // poisoning is ignored.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flights(&self) -> MutexGuard<'_, HashMap<String, Flight<T, E>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes a flight from the table when its task ends, however it ends.
struct Landing<T, E> {
    inner: Arc<Inner<T, E>>,
    key: String,
}
impl<T, E> Drop for Landing<T, E> {
    fn drop(&mut self) {
        self.inner.flights().remove(&self.key);
    }
}

impl<T, E> CacheStore<T, E> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock: Arc::new(clock),
                entries: Mutex::new(HashMap::new()),
                flights: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, payload: T, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(key.clone(), payload, self.inner.clock.now(), ttl);
        debug!(%key, %ttl, "cache put");
        self.inner.entries().insert(key, entry);
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.entries().remove(key).is_some()
    }

    /// Remove every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.flights().len()
    }
}

impl<T: Clone, E> CacheStore<T, E> {
    /// The payload for `key`, or `None` on a miss. Expired entries are
    /// misses and are removed.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entry(key).map(|entry| entry.payload)
    }

    /// The live entry for `key`, with its creation time and TTL.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries();
        if entries.get(key)?.is_expired(now) {
            debug!(key, "cache entry expired");
            entries.remove(key);
            return None;
        }
        entries.get(key).cloned()
    }
}

impl<T, E> CacheStore<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<ErrorKind> + 'static,
{
    /// Return the cached payload for `key`, or run `fetch` to produce it.
    ///
    /// Concurrent callers for the same key share a single run of `fetch` and
    /// all receive its outcome, success or failure. A successful outcome is
    /// stored with `ttl` before any waiter is woken.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self, fetch), fields(%ttl))]
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(payload) = self.get(key) {
            debug!("cache hit");
            return Ok(payload);
        }
        let flight = {
            let mut flights = self.inner.flights();
            match flights.get(key) {
                Some(flight) => {
                    debug!("joining in-flight fetch");
                    flight.clone()
                },
                None => {
                    // A flight may have landed between the first lookup and
                    // taking the lock; its result is in the table by now.
                    if let Some(payload) = self.get(key) {
                        debug!("cache hit after in-flight fetch landed");
                        return Ok(payload);
                    }
                    debug!("cache miss, starting fetch");
                    let flight = self.launch(key.to_string(), ttl, fetch());
                    flights.insert(key.to_string(), flight.clone());
                    flight
                },
            }
        };
        flight.await
    }

    fn launch<Fut>(&self, key: String, ttl: Duration, fetch: Fut) -> Flight<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let store = self.clone();
        let landing = Landing {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
        };
        let task = tokio::spawn(async move {
            let _landing = landing;
            let outcome = fetch.await;
            if let Ok(payload) = &outcome {
                store.put(key, payload.clone(), ttl);
            }
            outcome
        });
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(error = %err, "in-flight fetch task died");
                    Err(E::from(ErrorKind::FetchAborted(err.to_string())))
                },
            }
        }
        .boxed()
        .shared()
    }
}

impl<T, E> Clone for CacheStore<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Default for CacheStore<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Debug for CacheStore<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CacheStore")
            .field("clock", &self.inner.clock)
            .field("entries", &self.len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Upstream,
        Cache(ErrorKind),
    }
    impl From<ErrorKind> for TestError {
        fn from(kind: ErrorKind) -> Self {
            Self::Cache(kind)
        }
    }

    type Store = CacheStore<String, TestError>;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        outcome: Result<String, TestError>,
    ) -> impl Future<Output = Result<String, TestError>> + Send + 'static {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            outcome
        }
    }

    #[test]
    fn test_put_get_invalidate() {
        let store = Store::new();
        assert_eq!(store.get("record:1"), None);
        store.put("record:1", "one".to_string(), Duration::hours(1));
        assert_eq!(store.get("record:1").as_deref(), Some("one"));
        store.put("record:1", "uno".to_string(), Duration::hours(1));
        assert_eq!(store.get("record:1").as_deref(), Some("uno"));
        assert!(store.invalidate("record:1"));
        assert!(!store.invalidate("record:1"));
        assert_eq!(store.get("record:1"), None);
    }

    #[test]
    fn test_entry_expires_at_exactly_ttl() {
        let clock = ManualClock::default();
        let store = Store::with_clock(clock.clone());
        store.put("resolve:1", "slug".to_string(), Duration::seconds(60));

        clock.advance(Duration::seconds(59));
        assert_eq!(store.get("resolve:1").as_deref(), Some("slug"));

        clock.advance(Duration::seconds(1));
        assert_eq!(store.get("resolve:1"), None);
        // Lazily removed on the read that found it expired.
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let clock = ManualClock::default();
        let store = Store::with_clock(clock.clone());
        store.put("short", "a".to_string(), Duration::seconds(10));
        store.put("long", "b".to_string(), Duration::seconds(100));
        clock.advance(Duration::seconds(30));
        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_success() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = store
            .get_or_fetch("record:1", Duration::hours(1), || counting_fetch(&calls, Ok("one".to_string())))
            .await;
        let second = store
            .get_or_fetch("record:1", Duration::hours(1), || counting_fetch(&calls, Ok("two".to_string())))
            .await;
        assert_eq!(first, Ok("one".to_string()));
        assert_eq!(second, Ok("one".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let lookups = (0..16).map(|_| {
            store.get_or_fetch("record:7", Duration::hours(1), || counting_fetch(&calls, Ok("seven".to_string())))
        });
        let outcomes = futures::future::join_all(lookups).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(outcomes.iter().all(|o| o.as_deref() == Ok("seven")));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_failure() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let lookups = (0..8).map(|_| {
            store.get_or_fetch("record:8", Duration::hours(1), || counting_fetch(&calls, Err(TestError::Upstream)))
        });
        let outcomes = futures::future::join_all(lookups).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(outcomes.iter().all(|o| o == &Err(TestError::Upstream)));
        // Failures are not cached; the next lookup fetches again.
        assert!(store.is_empty());
        let retry = store
            .get_or_fetch("record:8", Duration::hours(1), || counting_fetch(&calls, Ok("eight".to_string())))
            .await;
        assert_eq!(retry, Ok("eight".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_fetch_still_populates() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let abandoned = tokio::time::timeout(
            StdDuration::from_millis(5),
            store.get_or_fetch("record:9", Duration::hours(1), || counting_fetch(&calls, Ok("nine".to_string()))),
        )
        .await;
        assert!(abandoned.is_err());
        tokio::time::sleep(StdDuration::from_millis(150)).await;
        assert_eq!(store.get("record:9").as_deref(), Some("nine"));
        assert_eq!(store.in_flight(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_reported_and_cleared() {
        let store = Store::new();
        let outcome = store
            .get_or_fetch("record:10", Duration::hours(1), || async {
                if store_is_broken() {
                    panic!("fetch exploded");
                }
                Ok::<_, TestError>("ten".to_string())
            })
            .await;
        assert!(matches!(outcome, Err(TestError::Cache(ErrorKind::FetchAborted(_)))));
        assert_eq!(store.in_flight(), 0);
        assert!(store.is_empty());
    }

    fn store_is_broken() -> bool {
        true
    }

    #[tokio::test]
    async fn test_different_keys_fetch_independently() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (a, b) = futures::join!(
            store.get_or_fetch("record:1", Duration::hours(1), || counting_fetch(&calls, Ok("a".to_string()))),
            store.get_or_fetch("resolve:1", Duration::hours(1), || counting_fetch(&calls, Ok("b".to_string()))),
        );
        assert_eq!((a, b), (Ok("a".to_string()), Ok("b".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.len(), 2);
    }
}
