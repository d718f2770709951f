/// Feed pages
use super::{html, posted_or_default, PageQuery, Posted};
use crate::error::{AppError, Result};
use crate::forms::TokenOnlyForm;
use crate::middleware::{CsrfToken, Viewer};
use crate::state::AppState;
use crate::views::{self, PageContext};
use actix_web::{web, HttpRequest, HttpResponse};

/// Index feed. The rendered page is cached per viewer and URL.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    query: PageQuery,
) -> Result<HttpResponse> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    if let Some(cached) = state.index_cache.get(viewer.user_id(), path_and_query).await {
        return Ok(html(cached));
    }

    let page = state.feeds().index(query.page.as_deref()).await?;
    // No forms on this page, so the CSRF token stays out of the cached bytes
    let ctx = PageContext::new(viewer.user.as_ref(), "");
    let body = views::feed::index(&ctx, &page);

    state
        .index_cache
        .put(viewer.user_id(), path_and_query, &body)
        .await;
    Ok(html(body))
}

pub async fn group_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    slug: web::Path<String>,
    query: PageQuery,
) -> Result<HttpResponse> {
    let feed = state
        .feeds()
        .group(&slug, query.page.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    Ok(html(views::feed::group(&ctx, &feed)))
}

pub async fn profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    username: web::Path<String>,
    query: PageQuery,
) -> Result<HttpResponse> {
    let feed = state
        .feeds()
        .profile(&username, viewer.user.as_ref(), query.page.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    Ok(html(views::feed::profile(&ctx, &feed)))
}

/// POST to a profile renders the same page once the CSRF token checks out
pub async fn profile_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    username: web::Path<String>,
    query: PageQuery,
    form: Posted<TokenOnlyForm>,
) -> Result<HttpResponse> {
    let form: TokenOnlyForm = posted_or_default(form);
    csrf.verify(form.csrfmiddlewaretoken.as_deref())?;
    profile(req, state, viewer, csrf, username, query).await
}

/// Posts by followed authors (login required)
pub async fn follow_index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    query: PageQuery,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let page = state.feeds().follow(user, query.page.as_deref()).await?;

    let ctx = PageContext::new(Some(user), csrf.as_str());
    Ok(html(views::feed::follow(&ctx, &page)))
}

/// Path plus query string, used as the post-login return target
pub(crate) fn request_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string())
}
