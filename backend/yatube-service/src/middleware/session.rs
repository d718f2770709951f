use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::session::{CSRF_COOKIE, SESSION_COOKIE};
use crate::state::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use rand::RngCore;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::warn;

const CSRF_TOKEN_BYTES: usize = 32;
const CSRF_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 3600;

/// Who is making the request
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<User>,
    /// Id of the live session backing `user`
    pub session_id: Option<String>,
}

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|user| user.id)
    }

    /// The logged-in user, or a redirect to the login page returning to `path`
    pub fn require(&self, path: &str) -> crate::error::Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::LoginRequired(path.to_string()))
    }
}

/// The visitor's CSRF token, as carried in the `csrftoken` cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        CsrfToken(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare the submitted form token against the cookie
    pub fn verify(&self, submitted: Option<&str>) -> crate::error::Result<()> {
        match submitted {
            Some(token) if constant_time_compare(token.as_bytes(), self.0.as_bytes()) => Ok(()),
            _ => {
                warn!("CSRF token missing or incorrect");
                Err(AppError::CsrfFailure)
            }
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

fn is_well_formed_token(value: &str) -> bool {
    value.len() == CSRF_TOKEN_BYTES * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Session cookie for `session_id`; an empty id with zero max-age clears it
pub fn session_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn csrf_cookie(token: &CsrfToken, secure: bool) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, token.0.clone())
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(CSRF_COOKIE_MAX_AGE_SECS))
        .finish()
}

async fn resolve_viewer(state: &AppState, session_id: Option<String>) -> Viewer {
    let Some(session_id) = session_id else {
        return Viewer::default();
    };

    let user = async {
        match state.sessions.load(&session_id).await? {
            Some(session) => state.store.find_user_by_id(session.user_id).await,
            None => Ok(None),
        }
    }
    .await;

    match user {
        Ok(Some(user)) => Viewer {
            user: Some(user),
            session_id: Some(session_id),
        },
        Ok(None) => Viewer::default(),
        Err(err) => {
            warn!(error = %err, "session lookup failed, treating request as anonymous");
            Viewer::default()
        }
    }
}

/// Actix middleware that attaches [`Viewer`] and [`CsrfToken`] to each request.
pub struct SessionMiddleware {
    state: web::Data<AppState>,
}

impl SessionMiddleware {
    pub fn new(state: web::Data<AppState>) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    state: web::Data<AppState>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let state = self.state.clone();

        Box::pin(async move {
            let existing = req
                .cookie(CSRF_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| is_well_formed_token(value));
            let (csrf, issued) = match existing {
                Some(value) => (CsrfToken(value), false),
                None => (CsrfToken::generate(), true),
            };

            let session_id = req
                .cookie(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty());
            let viewer = resolve_viewer(&state, session_id).await;

            req.extensions_mut().insert(csrf.clone());
            req.extensions_mut().insert(viewer);

            let mut res = service.call(req).await?;
            if issued {
                if let Err(err) = res
                    .response_mut()
                    .add_cookie(&csrf_cookie(&csrf, state.secure_cookies))
                {
                    warn!(error = %err, "failed to set CSRF cookie");
                }
            }
            Ok(res)
        })
    }
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<Viewer>().cloned().unwrap_or_default()))
    }
}

impl FromRequest for CsrfToken {
    type Error = Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CsrfToken>()
                .cloned()
                .ok_or_else(|| AppError::CsrfFailure.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = CsrfToken::generate();
        assert!(is_well_formed_token(token.as_str()));
        assert_ne!(token, CsrfToken::generate());
    }

    #[test]
    fn test_verify() {
        let token = CsrfToken("a".repeat(64));
        assert!(token.verify(Some(&"a".repeat(64))).is_ok());
        assert!(matches!(
            token.verify(Some(&"b".repeat(64))),
            Err(AppError::CsrfFailure)
        ));
        assert!(matches!(token.verify(None), Err(AppError::CsrfFailure)));
    }

    #[test]
    fn test_require_redirects_anonymous() {
        let viewer = Viewer::default();
        assert!(matches!(
            viewer.require("/follow/"),
            Err(AppError::LoginRequired(path)) if path == "/follow/"
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 60, true);
        assert_eq!(cookie.name(), "sessionid");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
