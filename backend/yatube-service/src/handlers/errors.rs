use crate::error::AppError;
use actix_web::{HttpRequest, HttpResponse, ResponseError};

/// Fallback for unmatched routes
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    AppError::not_found(req.path()).error_response()
}

/// Path segments that fail to parse (e.g. `/posts/abc/`) count as missing pages
pub fn path_error(_err: actix_web::error::PathError, req: &HttpRequest) -> actix_web::Error {
    AppError::not_found(req.path()).into()
}
