//! Shared fixtures for the HTTP tests: an app state backed by the
//! in-memory store and cache, plus request helpers.
#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::test::TestRequest;
use actix_web::web;
use std::sync::Arc;
use tempfile::TempDir;
use yatube_cache::MemoryCache;
use yatube_service::db::{GroupRepository, MemoryStore, PostRepository, UserRepository};
use yatube_service::models::{Group, NewPost, NewUser, Post, User};
use yatube_service::services::auth::hash_password;
use yatube_service::{AppState, Settings};

pub const PAGE_SIZE: i64 = 10;
pub const PASSWORD: &str = "correct-horse-battery";
/// A well-formed CSRF token (64 hex chars)
pub const CSRF: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
pub const BOUNDARY: &str = "----yatube-test-boundary";

pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04,
    0x01, 0x0a, 0x00, 0x01, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
    0x02, 0x4c, 0x01, 0x00, 0x3b,
];

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub media_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("temp media dir");
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let settings = Settings {
            posts_per_page: PAGE_SIZE,
            index_ttl_secs: 20,
            session_ttl_secs: 3600,
            media_root: media_dir.path().to_string_lossy().to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            secure_cookies: false,
        };
        let state = web::Data::new(AppState::new(store.clone(), cache.clone(), &settings));

        Self {
            state,
            store,
            cache,
            media_dir,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{}@example.com", username),
                password_hash: hash_password(PASSWORD).expect("hash"),
            })
            .await
            .expect("store")
            .expect("unique username")
    }

    pub async fn group(&self, slug: &str, title: &str) -> Group {
        self.store
            .create_group(slug, title, "Test group description")
            .await
            .expect("store")
            .expect("unique slug")
    }

    pub async fn post(&self, author: &User, group: Option<&Group>, text: &str) -> Post {
        self.store
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .expect("store")
    }

    /// Session id for a logged-in `user`
    pub async fn login(&self, user: &User) -> String {
        self.state
            .sessions
            .create(user.id)
            .await
            .expect("session")
    }
}

/// GET with the CSRF cookie and, when given, a session
pub fn get(uri: &str, session: Option<&str>) -> TestRequest {
    with_cookies(TestRequest::get().uri(uri), session)
}

/// POST with the CSRF cookie and, when given, a session
pub fn post(uri: &str, session: Option<&str>) -> TestRequest {
    with_cookies(TestRequest::post().uri(uri), session)
}

fn with_cookies(req: TestRequest, session: Option<&str>) -> TestRequest {
    let req = req.cookie(Cookie::new("csrftoken", CSRF));
    match session {
        Some(id) => req.cookie(Cookie::new("sessionid", id.to_string())),
        None => req,
    }
}

/// A multipart/form-data body; `file` is (field, filename, bytes)
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn location(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn count_posts_in(html: &str) -> usize {
    html.matches("<article class=\"post\">").count()
}
