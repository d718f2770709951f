use super::html;
use crate::middleware::Viewer;
use crate::views::{self, PageContext};
use actix_web::HttpResponse;

pub async fn author(viewer: Viewer) -> HttpResponse {
    html(views::about::author(&PageContext::new(viewer.user.as_ref(), "")))
}

pub async fn tech(viewer: Viewer) -> HttpResponse {
    html(views::about::tech(&PageContext::new(viewer.user.as_ref(), "")))
}
