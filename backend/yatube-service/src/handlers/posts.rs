/// Post handlers - detail, create, edit and comments
use super::{html, posted_or_default, redirect, Posted};
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, FormErrors, PostForm};
use crate::handlers::feed::request_path;
use crate::middleware::{CsrfToken, Viewer};
use crate::services::EditOutcome;
use crate::state::AppState;
use crate::views::{self, post_url, posts::PostFormValues, profile_url, PageContext};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn post_detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let detail = state
        .posts()
        .detail(post_id.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    Ok(html(views::posts::detail(&ctx, &detail)))
}

async fn render_form(
    state: &AppState,
    ctx: &PageContext<'_>,
    post_id: Option<i64>,
    values: &PostFormValues,
    errors: &FormErrors,
) -> Result<HttpResponse> {
    let groups = state.posts().group_choices().await?;
    Ok(html(views::posts::form(ctx, post_id, values, &groups, errors)))
}

pub async fn post_create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let ctx = PageContext::new(Some(user), csrf.as_str());
    render_form(&state, &ctx, None, &PostFormValues::default(), &FormErrors::new()).await
}

/// Valid form: store and go to the author's profile. Invalid: re-render.
pub async fn post_create(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    payload: Multipart,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let form = PostForm::from_multipart(payload, state.media.max_upload_bytes()).await?;
    csrf.verify(form.csrf_token.as_deref())?;

    let posts = state.posts();
    match posts.clean(&form).await? {
        Ok(draft) => {
            posts.create(user, draft).await?;
            Ok(redirect(&profile_url(&user.username)))
        }
        Err(errors) => {
            let ctx = PageContext::new(Some(user), csrf.as_str());
            let values = PostFormValues {
                text: form.text,
                group: form.group,
                current_image: None,
            };
            render_form(&state, &ctx, None, &values, &errors).await
        }
    }
}

pub async fn post_edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let post_id = post_id.into_inner();
    let post = state
        .posts()
        .find(post_id)
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    if post.author_id != user.id {
        return Ok(redirect(&post_url(post_id)));
    }

    let ctx = PageContext::new(Some(user), csrf.as_str());
    let values = PostFormValues {
        text: post.text,
        group: post.group_id.map(|id| id.to_string()),
        current_image: post.image,
    };
    render_form(&state, &ctx, Some(post_id), &values, &FormErrors::new()).await
}

/// Non-authors are sent back to the post without any change
pub async fn post_edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    post_id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let post_id = post_id.into_inner();
    let posts = state.posts();

    let existing = posts
        .find(post_id)
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;
    if existing.author_id != user.id {
        return Ok(redirect(&post_url(post_id)));
    }

    let form = PostForm::from_multipart(payload, state.media.max_upload_bytes()).await?;
    csrf.verify(form.csrf_token.as_deref())?;

    match posts.clean(&form).await? {
        Ok(draft) => match posts.edit(user, post_id, draft).await? {
            EditOutcome::Updated(_) | EditOutcome::NotAuthor => Ok(redirect(&post_url(post_id))),
            EditOutcome::NotFound => Err(AppError::not_found(req.path())),
        },
        Err(errors) => {
            let ctx = PageContext::new(Some(user), csrf.as_str());
            let values = PostFormValues {
                text: form.text,
                group: form.group,
                current_image: existing.image,
            };
            render_form(&state, &ctx, Some(post_id), &values, &errors).await
        }
    }
}

/// Always ends on the post page; blank comments are dropped
pub async fn add_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    post_id: web::Path<i64>,
    form: Posted<CommentForm>,
) -> Result<HttpResponse> {
    let user = viewer.require(&request_path(&req))?;
    let post_id = post_id.into_inner();
    let form: CommentForm = posted_or_default(form);
    csrf.verify(form.csrfmiddlewaretoken.as_deref())?;

    if state.posts().find(post_id).await?.is_none() {
        return Err(AppError::not_found(req.path()));
    }

    if let Ok(form) = form.clean() {
        state.comments().add_comment(post_id, user, &form.text).await?;
    }
    Ok(redirect(&post_url(post_id)))
}
