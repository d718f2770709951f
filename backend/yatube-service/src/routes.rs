/// URL table and application assembly
use crate::handlers::{about, auth, errors, feed, follow, health, media, posts};
use crate::metrics::serve_metrics;
use crate::middleware::SessionMiddleware;
use crate::state::AppState;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use tracing_actix_web::TracingLogger;

/// Register every page route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(feed::index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .service(
            web::resource("/profile/{username}/")
                .route(web::get().to(feed::profile))
                .route(web::post().to(feed::profile_post)),
        )
        .route(
            "/profile/{username}/follow/",
            web::get().to(follow::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::get().to(follow::profile_unfollow),
        )
        .route("/follow/", web::get().to(feed::follow_index))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route(
            "/posts/{post_id}/comment/",
            web::post().to(posts::add_comment),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout_post)),
                ),
        )
        .route("/about/author/", web::get().to(about::author))
        .route("/about/tech/", web::get().to(about::tech))
        .route("/media/{path:.*}", web::get().to(media::serve_media))
        .route("/health", web::get().to(health::health_summary))
        .route("/health/ready", web::get().to(health::readiness_summary))
        .route("/metrics", web::get().to(serve_metrics));
}

/// The complete application, shared by the server binary and the tests
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state.clone())
        .app_data(web::PathConfig::default().error_handler(errors::path_error))
        .wrap(SessionMiddleware::new(state))
        .wrap(TracingLogger::default())
        .configure(configure)
        .default_service(web::to(errors::not_found))
}
