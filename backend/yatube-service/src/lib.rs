/// Yatube Service Library
///
/// A server-rendered blog: posts with optional images and groups,
/// comments, author subscriptions and a short-lived index page cache.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers, one module per page family
/// - `views`: HTML rendering
/// - `services`: Business logic (feeds, posts, follows, auth, media)
/// - `db`: Repository traits with PostgreSQL and in-memory stores
/// - `cache`: Index page cache
/// - `session` / `middleware`: cookie sessions and CSRF
/// - `error`, `config`, `metrics`
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod views;

pub use config::Config;
pub use error::{AppError, Result};
pub use routes::build_app;
pub use state::{AppState, Settings};
