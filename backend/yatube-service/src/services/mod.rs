/// Business logic layer for the Yatube service
///
/// - Feed service: index, group, profile and follow feeds
/// - Post service: create, edit, detail
/// - Comment, follow and auth services
/// - Pagination and uploaded media storage
pub mod auth;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod media;
pub mod pagination;
pub mod posts;

pub use auth::AuthService;
pub use comments::CommentService;
pub use feed::{FeedService, GroupFeed, ProfileFeed};
pub use follow::FollowService;
pub use media::MediaStorage;
pub use pagination::{Page, PageWindow, Paginator};
pub use posts::{EditOutcome, PostDetail, PostDraft, PostService};
