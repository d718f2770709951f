/// Registration, login and logout
use super::{html, last_query_value, posted_or_default, redirect, Posted};
use crate::error::{AppError, Result};
use crate::forms::{safe_next, FormErrors, LoginForm, SignupForm, TokenOnlyForm, NON_FIELD};
use crate::middleware::{session_cookie, CsrfToken, Viewer};
use crate::models::User;
use crate::state::AppState;
use crate::views::{self, PageContext};
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Start a fresh session for `user` and redirect to `location`
async fn login_redirect(
    state: &AppState,
    viewer: &Viewer,
    user: &User,
    location: &str,
) -> Result<HttpResponse> {
    if let Some(old) = &viewer.session_id {
        state.sessions.destroy(old).await?;
    }
    let session_id = state.sessions.create(user.id).await?;
    info!(user_id = user.id, "user logged in");

    let mut response = redirect(location);
    response.add_cookie(&session_cookie(
        &session_id,
        state.sessions.ttl_secs() as i64,
        state.secure_cookies,
    ))
    .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

pub async fn signup_form(viewer: Viewer, csrf: CsrfToken) -> HttpResponse {
    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    html(views::auth::signup(
        &ctx,
        &SignupForm::default(),
        &FormErrors::new(),
    ))
}

pub async fn signup(
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    form: Posted<SignupForm>,
) -> Result<HttpResponse> {
    let submitted = posted_or_default(form);
    csrf.verify(submitted.csrfmiddlewaretoken.as_deref())?;
    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());

    let cleaned = match submitted.clone().clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(html(views::auth::signup(&ctx, &submitted, &errors))),
    };

    match state.auth().signup(cleaned).await? {
        Ok(user) => login_redirect(&state, &viewer, &user, "/").await,
        Err(errors) => Ok(html(views::auth::signup(&ctx, &submitted, &errors))),
    }
}

pub async fn login_form(req: HttpRequest, viewer: Viewer, csrf: CsrfToken) -> HttpResponse {
    let next = last_query_value(req.query_string(), "next");
    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    html(views::auth::login(
        &ctx,
        "",
        next.as_deref(),
        &FormErrors::new(),
    ))
}

pub async fn login(
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    form: Posted<LoginForm>,
) -> Result<HttpResponse> {
    let submitted = posted_or_default(form);
    csrf.verify(submitted.csrfmiddlewaretoken.as_deref())?;
    let ctx = PageContext::new(viewer.user.as_ref(), csrf.as_str());
    let next = submitted.next.clone();

    let cleaned = match submitted.clone().clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(html(views::auth::login(
                &ctx,
                &submitted.username,
                next.as_deref(),
                &errors,
            )))
        }
    };

    match state
        .auth()
        .authenticate(&cleaned.username, &cleaned.password)
        .await?
    {
        Some(user) => {
            let location = safe_next(next.as_deref()).unwrap_or_else(|| "/".to_string());
            login_redirect(&state, &viewer, &user, &location).await
        }
        None => Ok(html(views::auth::login(
            &ctx,
            &cleaned.username,
            next.as_deref(),
            &FormErrors::with(NON_FIELD, INVALID_LOGIN),
        ))),
    }
}

async fn end_session(state: &AppState, viewer: &Viewer) -> Result<HttpResponse> {
    if let Some(session_id) = &viewer.session_id {
        state.sessions.destroy(session_id).await?;
        info!(user_id = ?viewer.user_id(), "user logged out");
    }

    let mut response = html(views::auth::logged_out(&PageContext::anonymous()));
    response
        .add_removal_cookie(&session_cookie("", 0, state.secure_cookies))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

pub async fn logout(state: web::Data<AppState>, viewer: Viewer) -> Result<HttpResponse> {
    end_session(&state, &viewer).await
}

pub async fn logout_post(
    state: web::Data<AppState>,
    viewer: Viewer,
    csrf: CsrfToken,
    form: Posted<TokenOnlyForm>,
) -> Result<HttpResponse> {
    let form = posted_or_default(form);
    csrf.verify(form.csrfmiddlewaretoken.as_deref())?;
    end_session(&state, &viewer).await
}
