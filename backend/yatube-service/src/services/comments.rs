/// Comment service
use crate::db::{CommentRepository, Store};
use crate::error::Result;
use crate::metrics::activity::COMMENTS_CREATED_TOTAL;
use crate::models::{Comment, User};
use std::sync::Arc;
use tracing::info;

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Attach a comment to an existing post. `text` must already be cleaned.
    pub async fn add_comment(&self, post_id: i64, author: &User, text: &str) -> Result<Comment> {
        let comment = self
            .store
            .create_comment(post_id, author.id, text)
            .await?;

        COMMENTS_CREATED_TOTAL.inc();
        info!(
            comment_id = comment.id,
            post_id,
            author_id = author.id,
            "comment created"
        );
        Ok(comment)
    }
}
