//! In-process cache backend.
//!
//! Entries carry their own deadline and are dropped lazily when read after
//! expiry. Expired entries are also swept every few hundred writes.

use crate::{CacheBackend, CacheMetrics, CacheResult};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const SWEEP_EVERY_WRITES: u64 = 256;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
    writes: Arc<AtomicU64>,
    metrics: CacheMetrics,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        // The shard guard must be released before removing the stale entry.
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()));

        let value = match lookup {
            Some(Some(data)) => Some(data),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                None
            }
            None => None,
        };

        match value {
            Some(data) => {
                self.metrics.record_hit(key);
                Ok(Some(data))
            }
            None => {
                self.metrics.record_miss(key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> CacheResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        self.metrics.record_write(key);

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY_WRITES == 0 {
            self.sweep_expired();
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        self.metrics.record_invalidation(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false))
    }

    async fn scan_del(&self, pattern: &str) -> CacheResult<usize> {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.metrics.record_invalidation(key);
        }

        debug!(pattern = %pattern, deleted = matching.len(), "Cache scan delete");
        Ok(matching.len())
    }
}

/// Glob matcher supporting the `*` wildcard, the only one used by key patterns
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !key.starts_with(first) || key.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &key[first.len()..];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(idx) => rest = &rest[idx + middle.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("v1:page:index_page:*", "v1:page:index_page:anon:/"));
        assert!(glob_match("v1:page:*:anon:*", "v1:page:index_page:anon:/?page=2"));
        assert!(!glob_match("v1:page:index_page:*", "v1:session:abc"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[tokio::test]
    async fn test_set_get_del() {
        let cache = MemoryCache::new();
        cache.set("v1:page:x:anon:/", b"html".to_vec(), 20).await.unwrap();
        assert_eq!(
            cache.get("v1:page:x:anon:/").await.unwrap(),
            Some(b"html".to_vec())
        );
        assert!(cache.exists("v1:page:x:anon:/").await.unwrap());

        cache.del("v1:page:x:anon:/").await.unwrap();
        assert_eq!(cache.get("v1:page:x:anon:/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_expired() {
        let cache = MemoryCache::new();
        cache.set("v1:session:a", b"1".to_vec(), 0).await.unwrap();
        assert_eq!(cache.get("v1:session:a").await.unwrap(), None);
        assert!(!cache.exists("v1:session:a").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("v1:page:x:anon:/", b"html".to_vec(), 1).await.unwrap();
        assert!(cache.get("v1:page:x:anon:/").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("v1:page:x:anon:/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_del_only_touches_matching_keys() {
        let cache = MemoryCache::new();
        cache.set("v1:page:index_page:anon:/", b"a".to_vec(), 20).await.unwrap();
        cache.set("v1:page:index_page:7:/?page=2", b"b".to_vec(), 20).await.unwrap();
        cache.set("v1:session:s1", b"c".to_vec(), 20).await.unwrap();

        let removed = cache.scan_del("v1:page:index_page:*").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("v1:session:s1").await.unwrap());
    }
}
