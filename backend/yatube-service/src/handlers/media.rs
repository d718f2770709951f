/// Serves uploaded images from the media root
use crate::error::{AppError, Result};
use crate::services::media::content_type_for;
use crate::state::AppState;
use actix_web::{http::header, web, HttpRequest, HttpResponse};

pub async fn serve_media(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let relative = path.into_inner();
    let bytes = state
        .media
        .read(&relative)
        .await?
        .ok_or_else(|| AppError::not_found(req.path()))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&relative))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
