//! Cache key schema
//!
//! Every key written by the service goes through these builders.
//! Key format: v{VERSION}:{entity}:{identifier}[:sub_key]

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    // ============= Page Keys =============

    /// Rendered page cache
    /// Format: v1:page:{prefix}:{viewer}:{path_and_query}
    ///
    /// `viewer` is `anon` or the user id, because the navigation bar of a
    /// rendered page depends on who is looking at it.
    pub fn page(prefix: &str, viewer: Option<i64>, path_and_query: &str) -> String {
        let viewer = match viewer {
            Some(id) => id.to_string(),
            None => "anon".to_string(),
        };
        format!(
            "v{}:page:{}:{}:{}",
            CACHE_VERSION, prefix, viewer, path_and_query
        )
    }

    /// Pattern matching every cached page under a prefix
    pub fn page_pattern(prefix: &str) -> String {
        format!("v{}:page:{}:*", CACHE_VERSION, prefix)
    }

    // ============= Session Keys =============

    /// Session record
    /// Format: v1:session:{session_id}
    pub fn session(session_id: &str) -> String {
        format!("v{}:session:{}", CACHE_VERSION, session_id)
    }

    // ============= Utility =============

    /// Extract entity type from key
    pub fn entity_type(key: &str) -> Option<&str> {
        // Format: v{N}:{entity}:...
        key.split(':').nth(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_anonymous() {
        let key = CacheKey::page("index_page", None, "/?page=2");
        assert_eq!(key, "v1:page:index_page:anon:/?page=2");
    }

    #[test]
    fn test_page_key_per_viewer() {
        let a = CacheKey::page("index_page", Some(1), "/");
        let b = CacheKey::page("index_page", Some(2), "/");
        assert_ne!(a, b);
        assert!(a.starts_with("v1:page:index_page:"));
    }

    #[test]
    fn test_session_key() {
        let key = CacheKey::session("550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(key, "v1:session:550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_entity_type() {
        assert_eq!(CacheKey::entity_type("v1:page:index_page:anon:/"), Some("page"));
        assert_eq!(CacheKey::entity_type("v1:session:abc"), Some("session"));
        assert_eq!(CacheKey::entity_type("invalid"), None);
    }
}
