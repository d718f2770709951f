/// Follow graph operations
use crate::db::{FollowRepository, Store};
use crate::error::Result;
use crate::metrics::activity::FOLLOW_CHANGES_TOTAL;
use crate::models::User;
use std::sync::Arc;
use tracing::info;

pub struct FollowService {
    store: Arc<dyn Store>,
}

impl FollowService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Start following `author`. Idempotent; following yourself does nothing.
    /// Returns true if a new edge was created.
    pub async fn follow(&self, user: &User, author: &User) -> Result<bool> {
        if user.id == author.id {
            return Ok(false);
        }

        let created = self.store.create_follow(user.id, author.id).await?;
        if created {
            FOLLOW_CHANGES_TOTAL.with_label_values(&["follow"]).inc();
            info!(user_id = user.id, author_id = author.id, "follow created");
        }
        Ok(created)
    }

    /// Stop following `author`. Missing edges are a no-op.
    /// Returns true if an edge was removed.
    pub async fn unfollow(&self, user: &User, author: &User) -> Result<bool> {
        let removed = self.store.delete_follow(user.id, author.id).await?;
        if removed {
            FOLLOW_CHANGES_TOTAL.with_label_values(&["unfollow"]).inc();
            info!(user_id = user.id, author_id = author.id, "follow removed");
        }
        Ok(removed)
    }
}
