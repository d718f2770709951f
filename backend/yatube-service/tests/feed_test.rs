mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use yatube_service::build_app;
use yatube_service::db::{FollowRepository, PostRepository};

async fn body_of(resp: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_rt::test]
async fn test_feeds_paginate_by_page_size() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let group = ctx.group("test_slug", "Test group").await;
    for i in 0..(PAGE_SIZE + 3) {
        ctx.post(&author, Some(&group), &format!("Post number {}", i)).await;
    }
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for url in ["/", "/group/test_slug/", "/profile/author/"] {
        let resp = test::call_service(&app, get(url, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", url);
        assert_eq!(count_posts_in(&body_of(resp).await), PAGE_SIZE as usize, "{}", url);

        let second = format!("{}?page=2", url);
        let resp = test::call_service(&app, get(&second, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", second);
        assert_eq!(count_posts_in(&body_of(resp).await), 3, "{}", second);
    }
}

#[actix_rt::test]
async fn test_out_of_range_page_shows_last_page() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    for i in 0..(PAGE_SIZE + 3) {
        ctx.post(&author, None, &format!("Post number {}", i)).await;
    }
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, get("/profile/author/?page=99", None).to_request()).await;
    assert_eq!(count_posts_in(&body_of(resp).await), 3);

    let resp = test::call_service(&app, get("/profile/author/?page=abc", None).to_request()).await;
    assert_eq!(count_posts_in(&body_of(resp).await), PAGE_SIZE as usize);
}

#[actix_rt::test]
async fn test_repeated_page_parameter_uses_last_value() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    for i in 0..(PAGE_SIZE + 3) {
        ctx.post(&author, None, &format!("Post number {}", i)).await;
    }
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, get("/?page=1&page=2", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(count_posts_in(&body_of(resp).await), 3);

    let resp = test::call_service(&app, get("/profile/author/?page=2&page=x", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(count_posts_in(&body_of(resp).await), PAGE_SIZE as usize);
}

#[actix_rt::test]
async fn test_newest_post_first_with_group_link() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let group = ctx.group("test_slug", "Test group").await;
    ctx.post(&author, None, "Older post").await;
    ctx.post(&author, Some(&group), "Newest post").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let html = body_of(test::call_service(&app, get("/", None).to_request()).await).await;
    let newest = html.find("Newest post").expect("newest rendered");
    let older = html.find("Older post").expect("older rendered");
    assert!(newest < older);
    assert!(html.contains("/group/test_slug/"));
}

#[actix_rt::test]
async fn test_post_only_in_its_own_group() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let cats = ctx.group("cats", "Cats").await;
    ctx.group("dogs", "Dogs").await;
    ctx.post(&author, Some(&cats), "A post about cats").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let html = body_of(test::call_service(&app, get("/group/cats/", None).to_request()).await).await;
    assert_eq!(count_posts_in(&html), 1);
    let html = body_of(test::call_service(&app, get("/group/dogs/", None).to_request()).await).await;
    assert_eq!(count_posts_in(&html), 0);
}

#[actix_rt::test]
async fn test_index_cache_serves_stale_page_until_cleared() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let doomed = ctx.post(&author, None, "Soon to be deleted").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let first = body_of(test::call_service(&app, get("/", None).to_request()).await).await;
    assert!(first.contains("Soon to be deleted"));

    assert!(ctx.store.delete_post(doomed.id).await.unwrap());
    let cached = body_of(test::call_service(&app, get("/", None).to_request()).await).await;
    assert_eq!(first, cached);

    ctx.state.index_cache.clear().await.unwrap();
    let fresh = body_of(test::call_service(&app, get("/", None).to_request()).await).await;
    assert_ne!(first, fresh);
    assert!(!fresh.contains("Soon to be deleted"));
}

#[actix_rt::test]
async fn test_missing_objects_render_custom_404() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for url in [
        "/group/no_such_group/",
        "/profile/nobody/",
        "/posts/424242/",
        "/posts/not-a-number/",
        "/unexisting_page/",
    ] {
        let resp = test::call_service(&app, get(url, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", url);
        let html = body_of(resp).await;
        assert!(html.contains("Custom 404"), "{}", url);
        assert!(html.contains(url), "{}", url);
    }
}

#[actix_rt::test]
async fn test_follow_feed_shows_only_followed_authors() {
    let ctx = TestContext::new();
    let reader = ctx.user("reader").await;
    let followed = ctx.user("followed").await;
    let stranger = ctx.user("stranger").await;
    ctx.post(&followed, None, "From a followed author").await;
    ctx.post(&stranger, None, "From a stranger").await;
    assert!(ctx.store.create_follow(reader.id, followed.id).await.unwrap());

    let app = test::init_service(build_app(ctx.state.clone())).await;

    let session = ctx.login(&reader).await;
    let html = body_of(test::call_service(&app, get("/follow/", Some(&session)).to_request()).await).await;
    assert_eq!(count_posts_in(&html), 1);
    assert!(html.contains("From a followed author"));
    assert!(!html.contains("From a stranger"));

    let session = ctx.login(&stranger).await;
    let html = body_of(test::call_service(&app, get("/follow/", Some(&session)).to_request()).await).await;
    assert_eq!(count_posts_in(&html), 0);
}

#[actix_rt::test]
async fn test_profile_shows_follow_button_to_other_users() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let reader = ctx.user("reader").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let session = ctx.login(&reader).await;
    let html = body_of(
        test::call_service(&app, get("/profile/author/", Some(&session)).to_request()).await,
    )
    .await;
    assert!(html.contains("/profile/author/follow/"));

    let session = ctx.login(&author).await;
    let html = body_of(
        test::call_service(&app, get("/profile/author/", Some(&session)).to_request()).await,
    )
    .await;
    assert!(!html.contains("/profile/author/follow/"));
}

#[actix_rt::test]
async fn test_static_pages_are_public() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for url in ["/about/author/", "/about/tech/", "/auth/signup/", "/auth/login/"] {
        let resp = test::call_service(&app, get(url, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", url);
    }
}

#[actix_rt::test]
async fn test_private_pages_redirect_guests() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let existing = ctx.post(&author, None, "Some text").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let edit = format!("/posts/{}/edit/", existing.id);
    for url in ["/create/", "/follow/", edit.as_str()] {
        let resp = test::call_service(&app, get(url, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", url);
        assert_eq!(location(&resp), format!("/auth/login/?next={}", url));
    }
}

#[actix_rt::test]
async fn test_health_endpoint() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, get("/health", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
