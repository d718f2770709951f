/// HTTP handlers for the Yatube pages
///
/// - Feeds: index (cached), group, profile, follow
/// - Posts: detail, create, edit, comment
/// - Follow/unfollow, auth, about pages, uploaded media
/// - Health checks and the not-found fallback
pub mod about;
pub mod auth;
pub mod errors;
pub mod feed;
pub mod follow;
pub mod health;
pub mod media;
pub mod posts;

use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};

/// `?page=N` on feed pages; kept raw so garbage falls back to page 1.
/// A repeated `page` keeps the last value and unparsable query strings
/// count as no page at all.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn from_query_string(query: &str) -> Self {
        Self {
            page: last_query_value(query, "page"),
        }
    }
}

/// Last value of `key` in a query string, the way form data is read
pub(crate) fn last_query_value(query: &str, key: &str) -> Option<String> {
    web::Query::<Vec<(String, String)>>::from_query(query)
        .ok()?
        .into_inner()
        .into_iter()
        .filter(|(name, _)| name == key)
        .map(|(_, value)| value)
        .last()
}

impl FromRequest for PageQuery {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_query_string(req.query_string())))
    }
}

/// A urlencoded POST body. Extraction failures are kept so the handler can
/// check login first and then reject the empty form on its CSRF token.
pub type Posted<T> = std::result::Result<web::Form<T>, actix_web::Error>;

pub(crate) fn posted_or_default<T: Default>(posted: Posted<T>) -> T {
    match posted {
        Ok(form) => form.into_inner(),
        Err(err) => {
            tracing::debug!(error = %err, "unreadable form body, treating as empty");
            T::default()
        }
    }
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(body)
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_takes_last_value() {
        assert_eq!(PageQuery::from_query_string("").page, None);
        assert_eq!(PageQuery::from_query_string("page=3").page.as_deref(), Some("3"));
        assert_eq!(
            PageQuery::from_query_string("page=1&page=2").page.as_deref(),
            Some("2")
        );
        assert_eq!(
            PageQuery::from_query_string("sort=new&page=x").page.as_deref(),
            Some("x")
        );
    }
}
