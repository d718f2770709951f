/// Error types for the Yatube service
///
/// Every failure a handler can hit is one of these variants. Each variant
/// maps to exactly one response shape: a redirect, a rendered error page
/// with a fixed status, or a generic 500 page.
use crate::views;
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;
use yatube_cache::CacheError;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Cache or session backend failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Uploaded media could not be stored or read
    #[error("Media error: {0}")]
    Media(String),

    /// Request could not be interpreted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown slug, username or post id; carries the requested path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous access to a protected action; carries the return path
    #[error("Login required for {0}")]
    LoginRequired(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("CSRF verification failed")]
    CsrfFailure,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(path: impl Into<String>) -> Self {
        AppError::NotFound(path.into())
    }
}

/// Login URL with the return path appended, slashes left readable.
pub fn login_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("/auth/login/?next={}", encoded)
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Media(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired(_) => StatusCode::FOUND,
            AppError::Forbidden | AppError::CsrfFailure => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::LoginRequired(next) => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, login_url(next)))
                    .finish();
            }
            AppError::NotFound(path) => views::errors::not_found(path),
            AppError::Forbidden => views::errors::permission_denied(),
            AppError::CsrfFailure => views::errors::csrf_failure(),
            AppError::Validation(msg) => views::errors::bad_request(msg),
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Media(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                views::errors::server_error()
            }
        };

        HttpResponse::build(status)
            .content_type(mime::TEXT_HTML_UTF_8)
            .body(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Media(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_keeps_slashes() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=/create/");
    }

    #[test]
    fn test_login_url_encodes_query() {
        assert_eq!(
            login_url("/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::not_found("/group/nope/").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::CsrfFailure.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::LoginRequired("/create/".into()).status_code(),
            StatusCode::FOUND
        );
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_login_required_redirects() {
        let resp = AppError::LoginRequired("/create/".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=/create/"
        );
    }
}
