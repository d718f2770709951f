/// Shared application state handed to every handler
use crate::cache::IndexPageCache;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CommentService, FeedService, FollowService, MediaStorage, Paginator, PostService,
};
use crate::session::SessionStore;
use std::sync::Arc;
use yatube_cache::CacheBackend;

/// Tunables that shape request handling, derived from [`Config`]
#[derive(Debug, Clone)]
pub struct Settings {
    pub posts_per_page: i64,
    pub index_ttl_secs: u64,
    pub session_ttl_secs: u64,
    pub media_root: String,
    pub max_upload_bytes: usize,
    pub secure_cookies: bool,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            posts_per_page: config.feed.posts_per_page,
            index_ttl_secs: config.cache.index_ttl_secs,
            session_ttl_secs: config.cache.session_ttl_secs,
            media_root: config.media.root.clone(),
            max_upload_bytes: config.media.max_upload_bytes,
            secure_cookies: config.app.secure_cookies,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: Arc<dyn CacheBackend>,
    pub sessions: SessionStore,
    pub index_cache: IndexPageCache,
    pub media: MediaStorage,
    pub paginator: Paginator,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn CacheBackend>, settings: &Settings) -> Self {
        Self {
            sessions: SessionStore::new(cache.clone(), settings.session_ttl_secs),
            index_cache: IndexPageCache::new(cache.clone(), settings.index_ttl_secs),
            media: MediaStorage::new(&settings.media_root, settings.max_upload_bytes),
            paginator: Paginator::new(settings.posts_per_page),
            secure_cookies: settings.secure_cookies,
            store,
            cache,
        }
    }

    pub fn feeds(&self) -> FeedService {
        FeedService::new(self.store.clone(), self.paginator)
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone(), self.media.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store.clone())
    }

    pub fn follows(&self) -> FollowService {
        FollowService::new(self.store.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.store.clone())
    }
}
