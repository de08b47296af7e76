//! TTL cache used for hot read paths (tenant directory lookups).
//!
//! Instances are injected into the services that need them rather than held
//! as globals. Concurrent misses for the same key may each recompute the
//! value; the last writer wins. That stampede is an accepted non-guarantee
//! for this class of data.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct TtlCache<V: Clone> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the cached value unless the entry has outlived the TTL.
    /// Expired entries are left in place and overwritten by the next set.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_within_ttl() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(60));
        cache.set("demo", "value".to_string()).await;
        assert_eq!(cache.get("demo").await, Some("value".to_string()));
    }

    #[tokio::test]
    async fn expired_entries_read_as_miss() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_millis(10));
        cache.set("demo", "value".to_string()).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get("demo").await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache: TtlCache<i32> = TtlCache::new(Duration::from_secs(60));
        cache.set("k", 7).await;
        cache.invalidate("k").await;
        assert_eq!(cache.get("k").await, None);
    }
}
