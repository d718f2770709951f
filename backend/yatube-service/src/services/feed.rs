/// Feed assembly: filter, count, then load one page
use crate::db::{FollowRepository, GroupRepository, PostRepository, Store, UserRepository};
use crate::error::Result;
use crate::models::{Group, PostFilter, PostView, User};
use crate::services::pagination::{Page, Paginator};
use std::sync::Arc;

/// Group header plus one page of its posts
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

/// Author header plus one page of their posts
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub page: Page<PostView>,
    /// Whether the viewer follows this author (false for anonymous viewers)
    pub following: bool,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

pub struct FeedService {
    store: Arc<dyn Store>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>, paginator: Paginator) -> Self {
        Self { store, paginator }
    }

    async fn page(&self, filter: PostFilter, raw_page: Option<&str>) -> Result<Page<PostView>> {
        let total = self.store.count_posts(filter).await?;
        let window = self.paginator.window(total, raw_page);
        let items = self
            .store
            .list_posts(filter, window.offset(), window.limit())
            .await?;
        Ok(Page { items, window })
    }

    /// Every post, newest first
    pub async fn index(&self, raw_page: Option<&str>) -> Result<Page<PostView>> {
        self.page(PostFilter::All, raw_page).await
    }

    /// Posts in one group; `None` when the slug is unknown
    pub async fn group(&self, slug: &str, raw_page: Option<&str>) -> Result<Option<GroupFeed>> {
        let Some(group) = self.store.find_group_by_slug(slug).await? else {
            return Ok(None);
        };
        let page = self.page(PostFilter::Group(group.id), raw_page).await?;
        Ok(Some(GroupFeed { group, page }))
    }

    /// Posts by one author; `None` when the username is unknown
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&User>,
        raw_page: Option<&str>,
    ) -> Result<Option<ProfileFeed>> {
        let Some(author) = self.store.find_user_by_username(username).await? else {
            return Ok(None);
        };

        let page = self.page(PostFilter::Author(author.id), raw_page).await?;
        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.store.is_following(viewer.id, author.id).await?
            }
            _ => false,
        };
        let followers_count = self.store.count_followers(author.id).await?;
        let following_count = self.store.count_following(author.id).await?;

        Ok(Some(ProfileFeed {
            posts_count: page.window.total,
            author,
            page,
            following,
            followers_count,
            following_count,
        }))
    }

    /// Posts by every author the viewer follows
    pub async fn follow(&self, viewer: &User, raw_page: Option<&str>) -> Result<Page<PostView>> {
        self.page(PostFilter::FollowedBy(viewer.id), raw_page).await
    }
}
