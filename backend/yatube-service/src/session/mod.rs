//! Cookie sessions stored in the cache backend.
//!
//! The cookie carries only a random session id; the record under
//! `v1:session:{id}` holds the user id as JSON and expires with the TTL.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use yatube_cache::{CacheBackend, CacheKey};

pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn CacheBackend>,
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self { backend, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Start a session for `user_id` and return its id
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let session_id = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_vec(&SessionData { user_id })?;
        self.backend
            .set(&CacheKey::session(&session_id), payload, self.ttl_secs)
            .await?;
        debug!(user_id, "session created");
        Ok(session_id)
    }

    /// Load a live session. Unknown, expired or corrupt records are `None`.
    pub async fn load(&self, session_id: &str) -> Result<Option<SessionData>> {
        let Some(bytes) = self.backend.get(&CacheKey::session(session_id)).await? else {
            return Ok(None);
        };
        Ok(serde_json::from_slice(&bytes).ok())
    }

    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        self.backend.del(&CacheKey::session(session_id)).await?;
        Ok(())
    }
}
