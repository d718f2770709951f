//! Yatube caching layer
//!
//! Provides a single cache abstraction for the service with:
//! - Versioned key schema
//! - Redis backend (shared across service instances)
//! - In-process backend (single node, tests)
//! - SCAN-based pattern invalidation (no blocking KEYS)
//! - Metrics integration

mod error;
mod keys;
mod memory;
mod metrics;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use memory::MemoryCache;
pub use metrics::CacheMetrics;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Pipeline};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Default TTL values (seconds)
pub mod ttl {
    pub const INDEX_PAGE: u64 = 20;
    pub const SESSION: u64 = 14 * 24 * 3600; // 2 weeks
}

/// Core cache operations.
///
/// Values are opaque bytes; callers own the encoding. The trait is object
/// safe so the service can pick a backend at start-up.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from cache
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Set a value in cache with TTL
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> CacheResult<()>;

    /// Delete a key from cache
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Delete every key matching a glob pattern, returns the number removed
    async fn scan_del(&self, pattern: &str) -> CacheResult<usize>;

    /// Backend liveness check
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// Redis-backed cache
#[derive(Clone)]
pub struct RedisCache {
    redis: SharedRedis,
    metrics: CacheMetrics,
}

impl RedisCache {
    pub fn new(redis: SharedRedis) -> Self {
        Self {
            redis,
            metrics: CacheMetrics::new(),
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.redis.lock().await;

        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(Some(data)) => {
                debug!(key = %key, "Cache hit");
                self.metrics.record_hit(key);
                Ok(Some(data))
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_miss(key);
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis get error");
                self.metrics.record_error(key, "redis");
                Err(CacheError::Redis(e))
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| {
                self.metrics.record_error(key, "redis");
                CacheError::Redis(e)
            })?;

        debug!(key = %key, ttl = ttl_secs, "Cache set");
        self.metrics.record_write(key);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.del::<_, ()>(key).await.map_err(CacheError::Redis)?;

        debug!(key = %key, "Cache delete");
        self.metrics.record_invalidation(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.redis.lock().await;
        let exists: bool = conn.exists(key).await.map_err(CacheError::Redis)?;
        Ok(exists)
    }

    async fn scan_del(&self, pattern: &str) -> CacheResult<usize> {
        let mut conn = self.redis.lock().await;
        let mut cursor: u64 = 0;
        let mut total_deleted = 0;

        loop {
            // Use SCAN instead of KEYS to avoid blocking
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut *conn)
                .await
                .map_err(CacheError::Redis)?;

            if !keys.is_empty() {
                let mut pipe = Pipeline::new();
                for key in &keys {
                    pipe.del(key);
                }
                pipe.query_async::<_, ()>(&mut *conn)
                    .await
                    .map_err(CacheError::Redis)?;

                for key in &keys {
                    self.metrics.record_invalidation(key);
                }
                total_deleted += keys.len();
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %pattern, deleted = total_deleted, "Cache scan delete");
        Ok(total_deleted)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        redis::cmd("PING")
            .query_async::<_, String>(&mut *conn)
            .await
            .map_err(CacheError::Redis)?;
        Ok(())
    }
}
