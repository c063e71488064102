use crate::error::DirectoryError;
use crate::error::Result;
use lru::LruCache;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use tokio::sync::OnceCell;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Identity of a request: query name plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    name: String,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;
type Slot = Arc<OnceCell<CachedValue>>;

/// Request-keyed result cache.
///
/// Callers asking for the same key while a fetch is running wait for that
/// fetch instead of issuing their own. Only successful results are kept;
/// a failed fetch leaves the slot empty so the next caller retries.
pub struct QueryCache {
    slots: Mutex<LruCache<QueryKey, Slot>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let slot = self.slot(&key);
        let value = slot
            .get_or_try_init(|| async {
                debug!("fetching {key}");
                let value = fetch().await?;
                Ok::<CachedValue, DirectoryError>(Arc::new(value))
            })
            .await?;

        value
            .clone()
            .downcast::<T>()
            .map(|value| T::clone(&value))
            .map_err(|_| DirectoryError::CacheTypeMismatch(key.to_string()))
    }

    /// Drop a key; the next fetch goes to the backend. A fetch already in
    /// flight for it completes into a detached slot.
    pub fn invalidate(&self, key: &QueryKey) {
        self.lock().pop(key);
    }

    /// Drop every key whose name matches and whose params contain `param`.
    pub fn invalidate_matching(&self, name: &str, param: &str) {
        let mut slots = self.lock();
        let stale: Vec<QueryKey> = slots
            .iter()
            .map(|(key, _)| key)
            .filter(|key| key.name == name && key.params.iter().any(|p| p == param))
            .cloned()
            .collect();
        for key in stale {
            slots.pop(&key);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of keys holding a finished result.
    pub fn cached_len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .count()
    }

    fn slot(&self, key: &QueryKey) -> Slot {
        let mut slots = self.lock();
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        let slot: Slot = Arc::new(OnceCell::new());
        slots.put(key.clone(), Arc::clone(&slot));
        slot
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<QueryKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neighborly_backend::BackendError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[test]
    fn key_display_lists_params() {
        let key = QueryKey::new("vendor_costs", ["v1"]);
        assert_eq!(key.to_string(), "vendor_costs(v1)");
        assert_eq!(
            QueryKey::new("point_rewards", Vec::<String>::new()).to_string(),
            "point_rewards()"
        );
    }

    #[tokio::test]
    async fn caches_successful_results() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new("point_rewards", Vec::<String>::new());

        for _ in 0..3 {
            let value: u32 = cache
                .fetch(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::default();
        let key = QueryKey::new("is_admin", ["u1"]);

        let first: Result<bool> = cache
            .fetch(key.clone(), || async {
                Err(BackendError::Request("offline".to_string()).into())
            })
            .await;
        assert!(first.is_err());

        let second: bool = cache
            .fetch(key, || async { Ok(true) })
            .await
            .unwrap();
        assert!(second);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new("user_reviews", ["u1"]);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(vec!["r1".to_string()])
        };
        let (a, b) = tokio::join!(cache.fetch(key.clone(), fetch), cache.fetch(key.clone(), fetch));

        assert_eq!(a.unwrap(), vec!["r1".to_string()]);
        assert_eq!(b.unwrap(), vec!["r1".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = QueryCache::default();
        let key = QueryKey::new("user_home_vendors", ["u1"]);

        let first: u32 = cache.fetch(key.clone(), || async { Ok(1) }).await.unwrap();
        cache.invalidate(&key);
        let second: u32 = cache.fetch(key.clone(), || async { Ok(2) }).await.unwrap();
        assert_eq!((first, second), (1, 2));

        cache.invalidate_matching("user_home_vendors", "u1");
        assert_eq!(cache.cached_len(), 0);
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() {
        let cache = QueryCache::default();
        let key = QueryKey::new("shared", ["x"]);
        let _: u32 = cache.fetch(key.clone(), || async { Ok(1) }).await.unwrap();

        let err = cache
            .fetch::<String, _, _>(key, || async { Ok("nope".to_string()) })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::CacheTypeMismatch(_)));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recent_key() {
        let cache = QueryCache::new(1);
        let a = QueryKey::new("a", Vec::<String>::new());
        let b = QueryKey::new("b", Vec::<String>::new());
        let _: u32 = cache.fetch(a, || async { Ok(1) }).await.unwrap();
        let _: u32 = cache.fetch(b, || async { Ok(2) }).await.unwrap();
        assert_eq!(cache.cached_len(), 1);
    }
}
