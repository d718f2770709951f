/// Database access layer
///
/// One trait per aggregate, all implemented by [`PgStore`] (PostgreSQL) and
/// by [`memory::MemoryStore`] (process-local, used by tests). Handlers only
/// ever see `Arc<dyn Store>`.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

use crate::error::Result;
use crate::models::{
    Comment, CommentView, Group, NewPost, NewUser, Post, PostFilter, PostUpdate, PostView, User,
};
use sqlx::PgPool;

pub use memory::MemoryStore;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; `Ok(None)` when the username is already taken
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait::async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a group; `Ok(None)` when the slug is already taken
    async fn create_group(&self, slug: &str, title: &str, description: &str)
        -> Result<Option<Group>>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn find_group_by_id(&self, group_id: i64) -> Result<Option<Group>>;

    /// All groups ordered by title
    async fn list_groups(&self) -> Result<Vec<Group>>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, new_post: NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>>;

    /// Replace text/group (and image when given); `Ok(None)` if the post is gone
    async fn update_post(&self, post_id: i64, update: PostUpdate) -> Result<Option<Post>>;

    /// Returns true if a row was removed
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    /// Newest first, ties broken by id
    async fn list_posts(&self, filter: PostFilter, offset: i64, limit: i64)
        -> Result<Vec<PostView>>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    async fn count_comments(&self, post_id: i64) -> Result<i64>;
}

#[async_trait::async_trait]
pub trait FollowRepository: Send + Sync {
    /// Idempotent create; returns true if a new edge was inserted
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Idempotent delete; returns true if an edge was removed
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn count_followers(&self, author_id: i64) -> Result<i64>;

    async fn count_following(&self, user_id: i64) -> Result<i64>;
}

/// Everything the service needs from persistence
#[async_trait::async_trait]
pub trait Store:
    UserRepository + GroupRepository + PostRepository + CommentRepository + FollowRepository
{
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Run the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// True when the error is a unique-constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
