//! Process-local store
//!
//! Holds every table in one lock so each operation sees a consistent
//! snapshot, the way a single SQL statement would. Ordering and uniqueness
//! rules match the PostgreSQL schema.

use super::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, Store, UserRepository,
};
use crate::error::Result;
use crate::models::{
    Comment, CommentView, Group, NewPost, NewUser, Post, PostFilter, PostUpdate, PostView, User,
};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// (follower, author)
    follows: BTreeSet<(i64, i64)>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self.follows.contains(&(user_id, post.author_id)),
        }
    }

    fn view(&self, post: &Post) -> PostView {
        let author_username = self
            .users
            .get(&post.author_id)
            .map(|user| user.username.clone())
            .unwrap_or_default();
        let group = post.group_id.and_then(|id| self.groups.get(&id));

        PostView {
            id: post.id,
            text: post.text.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
            author_id: post.author_id,
            author_username,
            group_id: post.group_id,
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
        }
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        if removed {
            self.comments.retain(|_, comment| comment.post_id != post_id);
        }
        removed
    }
}

/// In-memory implementation of every repository trait
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Ok(None);
        }

        let user = User {
            id: tables.allocate_id(),
            username: new_user.username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait::async_trait]
impl GroupRepository for MemoryStore {
    async fn create_group(
        &self,
        slug: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Group>> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|group| group.slug == slug) {
            return Ok(None);
        }

        let group = Group {
            id: tables.allocate_id(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };
        tables.groups.insert(group.id, group.clone());
        Ok(Some(group))
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let mut tables = self.tables.write().await;
        let post = Post {
            id: tables.allocate_id(),
            text: new_post.text,
            image: new_post.image,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            created_at: Utc::now(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&post_id).map(|post| tables.view(post)))
    }

    async fn update_post(&self, post_id: i64, update: PostUpdate) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };

        post.text = update.text;
        post.group_id = update.group_id;
        if update.image.is_some() {
            post.image = update.image;
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.tables.write().await.remove_post(post_id))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|post| tables.matches(post, filter))
            .count();
        Ok(count as i64)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| tables.matches(post, filter))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|post| tables.view(post))
            .collect())
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        let comment = Comment {
            id: tables.allocate_id(),
            post_id,
            author_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let tables = self.tables.read().await;
        // BTreeMap iteration is id order, which is creation order
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .map(|comment| CommentView {
                id: comment.id,
                post_id: comment.post_id,
                author_id: comment.author_id,
                author_username: tables
                    .users
                    .get(&comment.author_id)
                    .map(|user| user.username.clone())
                    .unwrap_or_default(),
                text: comment.text.clone(),
                created_at: comment.created_at,
            })
            .collect())
    }

    async fn count_comments(&self, post_id: i64) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .count() as i64)
    }
}

#[async_trait::async_trait]
impl FollowRepository for MemoryStore {
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        if user_id == author_id {
            return Ok(false);
        }
        Ok(self.tables.write().await.follows.insert((user_id, author_id)))
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(self.tables.write().await.follows.remove(&(user_id, author_id)))
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .follows
            .contains(&(user_id, author_id)))
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|(_, a)| *a == author_id).count() as i64)
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|(u, _)| *u == user_id).count() as i64)
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(NewUser {
                username: name.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{}@example.com", name),
                password_hash: "x".into(),
            })
            .await
            .unwrap()
            .unwrap()
    }

    async fn post(store: &MemoryStore, author: i64, group: Option<i64>, text: &str) -> Post {
        store
            .create_post(NewPost {
                author_id: author,
                text: text.to_string(),
                group_id: group,
                image: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        user(&store, "leo").await;
        let again = store
            .create_user(NewUser {
                username: "leo".into(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                password_hash: "y".into(),
            })
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_list_posts_newest_first_with_filters() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let other = user(&store, "other").await;
        let group = store
            .create_group("cats", "Cats", "")
            .await
            .unwrap()
            .unwrap();

        let first = post(&store, author.id, Some(group.id), "first").await;
        let second = post(&store, other.id, None, "second").await;
        let third = post(&store, author.id, None, "third").await;

        let all = store.list_posts(PostFilter::All, 0, 10).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let in_group = store
            .list_posts(PostFilter::Group(group.id), 0, 10)
            .await
            .unwrap();
        assert_eq!(in_group.len(), 1);
        assert_eq!(in_group[0].group_slug.as_deref(), Some("cats"));

        assert_eq!(
            store.count_posts(PostFilter::Author(author.id)).await.unwrap(),
            2
        );
        let page = store.list_posts(PostFilter::All, 1, 1).await.unwrap();
        assert_eq!(page[0].id, second.id);
    }

    #[tokio::test]
    async fn test_follow_edges() {
        let store = MemoryStore::new();
        let reader = user(&store, "reader").await;
        let author = user(&store, "author").await;
        post(&store, author.id, None, "hello").await;

        assert!(store.create_follow(reader.id, author.id).await.unwrap());
        assert!(!store.create_follow(reader.id, author.id).await.unwrap());
        assert!(!store.create_follow(reader.id, reader.id).await.unwrap());
        assert_eq!(store.count_followers(author.id).await.unwrap(), 1);
        assert_eq!(
            store
                .count_posts(PostFilter::FollowedBy(reader.id))
                .await
                .unwrap(),
            1
        );

        assert!(store.delete_follow(reader.id, author.id).await.unwrap());
        assert!(!store.delete_follow(reader.id, author.id).await.unwrap());
        assert!(!store.is_following(reader.id, author.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_image_and_delete_cascades() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let created = store
            .create_post(NewPost {
                author_id: author.id,
                text: "before".into(),
                group_id: None,
                image: Some("posts/a.png".into()),
            })
            .await
            .unwrap();
        store
            .create_comment(created.id, author.id, "nice")
            .await
            .unwrap();

        let updated = store
            .update_post(
                created.id,
                PostUpdate {
                    text: "after".into(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.text, "after");
        assert_eq!(updated.image.as_deref(), Some("posts/a.png"));

        assert!(store.delete_post(created.id).await.unwrap());
        assert_eq!(store.count_comments(created.id).await.unwrap(), 0);
    }
}
