/// Data models for the Yatube service
///
/// Row types mirror the tables; the `*View` types are the joined read
/// models the pages render.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Replacement values for an edit. `image: None` keeps the current image.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Post joined with its author and group, as shown in feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

impl PostView {
    /// Leading characters of the text, used as the page title
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head)
        } else {
            head
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Which posts a feed shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by authors the given user follows
    FollowedBy(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_text(text: &str) -> PostView {
        PostView {
            id: 1,
            text: text.to_string(),
            image: None,
            created_at: Utc::now(),
            author_id: 1,
            author_username: "author".into(),
            group_id: None,
            group_slug: None,
            group_title: None,
        }
    }

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(post_with_text("short").excerpt(30), "short");
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        let post = post_with_text("Тестовый пост про кэширование страниц");
        assert_eq!(post.excerpt(8), "Тестовый…");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user = User {
            id: 1,
            username: "leo".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "leo");
    }
}
