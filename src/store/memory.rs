use crate::core::cache::{Cache, DEFAULT_TTL};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// In-memory cache with lazy TTL expiry.
///
/// Expired entries are dropped when they are next read; there is no
/// background sweeper. [`MemoryCache::get_or_fetch`] additionally lets only
/// one caller per key run the supplier at a time.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
    gates: std::sync::Mutex<HashMap<K, Arc<Mutex<()>>>>,
    ttl: Duration,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose `get_or_fetch` entries live for [`DEFAULT_TTL`].
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            gates: std::sync::Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `supplier` and caches its
    /// successful result for the configured TTL.
    ///
    /// Errors are returned as-is and never cached. If the returned future is
    /// dropped while the supplier is running, nothing is stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, supplier: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let gate = GateGuard {
            gates: &self.gates,
            key: &key,
            gate: self.gate_for(&key),
        };
        let _turn = gate.gate.lock().await;
        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let fetched = supplier().await;
        if let Ok(value) = &fetched {
            self.put(key.clone(), value.clone(), Some(self.ttl)).await;
        }
        fetched
    }

    fn gate_for(&self, key: &K) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(gates.entry(key.clone()).or_default())
    }
}

/// Drops a key's gate once its last caller is done, including a caller
/// whose future was cancelled mid-fetch.
struct GateGuard<'a, K: Eq + Hash> {
    gates: &'a std::sync::Mutex<HashMap<K, Arc<Mutex<()>>>>,
    key: &'a K,
    gate: Arc<Mutex<()>>,
}

impl<K: Eq + Hash> Drop for GateGuard<'_, K> {
    fn drop(&mut self) {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&self.gate) <= 2 {
            gates.remove(self.key);
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let Some(entry) = cache.get(key) else {
            debug!("Cache MISS for key: {:?}", key);
            return None;
        };

        if entry.expires_at.is_some_and(|expiry| expiry <= Instant::now()) {
            debug!("Cache entry expired for key: {:?}", key);
            cache.remove(key);
            return None;
        }
        debug!("Cache HIT for key: {:?}", key);
        Some(entry.value.clone())
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let cache_value = CacheValue { value, expires_at };

        let mut cache = self.inner.lock().await;
        let now = Instant::now();
        let before = cache.len();
        cache.retain(|_, entry| entry.expires_at.is_none_or(|expiry| expiry > now));
        if cache.len() < before {
            debug!("Cache swept {} expired entries", before - cache.len());
        }
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, cache_value);
    }
}
