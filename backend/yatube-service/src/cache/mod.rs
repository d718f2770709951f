/// Rendered page caching
///
/// Only the index feed is cached. Entries expire after a short TTL and are
/// never invalidated by writes; `clear` removes them all at once.
use crate::metrics::activity::INDEX_CACHE_EVENTS;
use std::sync::Arc;
use tracing::{debug, warn};
use yatube_cache::{CacheBackend, CacheKey, CacheResult};

const INDEX_PREFIX: &str = "index_page";

#[derive(Clone)]
pub struct IndexPageCache {
    backend: Arc<dyn CacheBackend>,
    ttl_secs: u64,
}

impl IndexPageCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self { backend, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Cached HTML for this viewer and URL. Backend failures count as a miss.
    pub async fn get(&self, viewer: Option<i64>, path_and_query: &str) -> Option<String> {
        let key = CacheKey::page(INDEX_PREFIX, viewer, path_and_query);
        match self.backend.get(&key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(html) => {
                    INDEX_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                    debug!(key = %key, "index page cache hit");
                    Some(html)
                }
                Err(_) => {
                    INDEX_CACHE_EVENTS.with_label_values(&["error"]).inc();
                    warn!(key = %key, "cached index page is not valid UTF-8");
                    None
                }
            },
            Ok(None) => {
                INDEX_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                None
            }
            Err(err) => {
                INDEX_CACHE_EVENTS.with_label_values(&["error"]).inc();
                warn!(key = %key, error = %err, "index page cache read failed");
                None
            }
        }
    }

    /// Store rendered HTML. Failures are logged and otherwise ignored.
    pub async fn put(&self, viewer: Option<i64>, path_and_query: &str, html: &str) {
        if self.ttl_secs == 0 {
            return;
        }
        let key = CacheKey::page(INDEX_PREFIX, viewer, path_and_query);
        if let Err(err) = self
            .backend
            .set(&key, html.as_bytes().to_vec(), self.ttl_secs)
            .await
        {
            warn!(key = %key, error = %err, "index page cache write failed");
        }
    }

    /// Drop every cached index page, returning how many were removed
    pub async fn clear(&self) -> CacheResult<usize> {
        let removed = self
            .backend
            .scan_del(&CacheKey::page_pattern(INDEX_PREFIX))
            .await?;
        debug!(removed, "index page cache cleared");
        Ok(removed)
    }
}
