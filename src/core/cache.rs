//! Cache abstractions

use async_trait::async_trait;
use std::time::Duration;

/// Entries live for five minutes unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    /// Returns the value for `key` unless it is absent or expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`; `None` means it never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
}

/// Key for a cached record. Includes the period so that series of the same
/// asset never collide, e.g. `crypto-BTC-1month`.
pub fn record_key(category: &str, asset: Option<&str>, period: &str) -> String {
    match asset {
        Some(asset) => format!("{category}-{asset}-{period}"),
        None => format!("{category}-{period}"),
    }
}
