/// Follow and unfollow an author, then return to their profile
use super::redirect;
use crate::views::profile_url;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::handlers::feed::request_path;
use crate::middleware::Viewer;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn profile_follow(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let author = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    state.follows().follow(user, &author).await?;
    Ok(redirect(&profile_url(&author.username)))
}

pub async fn profile_unfollow(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let author = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    state.follows().unfollow(user, &author).await?;
    Ok(redirect(&profile_url(&author.username)))
}
