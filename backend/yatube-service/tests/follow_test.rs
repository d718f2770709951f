mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use yatube_service::build_app;
use yatube_service::db::FollowRepository;

#[actix_rt::test]
async fn test_follow_twice_creates_one_edge() {
    let ctx = TestContext::new();
    let reader = ctx.user("reader").await;
    let author = ctx.user("author").await;
    let session = ctx.login(&reader).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            get("/profile/author/follow/", Some(&session)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/author/");
    }

    assert!(ctx.store.is_following(reader.id, author.id).await.unwrap());
    assert_eq!(ctx.store.count_followers(author.id).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_unfollow_removes_edge_and_is_idempotent() {
    let ctx = TestContext::new();
    let reader = ctx.user("reader").await;
    let author = ctx.user("author").await;
    ctx.store.create_follow(reader.id, author.id).await.unwrap();
    let session = ctx.login(&reader).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            get("/profile/author/unfollow/", Some(&session)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/author/");
    }

    assert!(!ctx.store.is_following(reader.id, author.id).await.unwrap());
    assert_eq!(ctx.store.count_followers(author.id).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_self_follow_is_ignored() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let session = ctx.login(&author).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(
        &app,
        get("/profile/author/follow/", Some(&session)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/author/");
    assert!(!ctx.store.is_following(author.id, author.id).await.unwrap());
    assert_eq!(ctx.store.count_following(author.id).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_follow_unknown_author_is_404() {
    let ctx = TestContext::new();
    let reader = ctx.user("reader").await;
    let session = ctx.login(&reader).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(
        &app,
        get("/profile/ghost/follow/", Some(&session)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_guest_follow_redirects_to_login() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, get("/profile/author/follow/", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        "/auth/login/?next=/profile/author/follow/"
    );
    assert_eq!(ctx.store.count_followers(author.id).await.unwrap(), 0);
}
