use actix_web::{web, HttpServer};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use redis_utils::RedisPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_cache::{CacheBackend, CacheMetrics, MemoryCache, RedisCache};
use yatube_service::config::CacheBackendKind;
use yatube_service::db::{self, PgStore};
use yatube_service::{build_app, AppState, Config, Settings};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn connect_cache(config: &Config) -> io::Result<Arc<dyn CacheBackend>> {
    match config.cache.backend {
        CacheBackendKind::Redis => {
            let redis_pool = RedisPool::connect(&config.cache.url).await.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to initialize Redis connection: {e}"),
                )
            })?;
            tracing::info!("Using Redis cache backend");
            Ok(Arc::new(RedisCache::new(redis_pool.manager())))
        }
        CacheBackendKind::Memory => {
            tracing::warn!("Using in-process cache backend; sessions are lost on restart");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

/// Yatube Service
///
/// Server-rendered blog: feeds, posts, comments, follows and accounts.
///
/// Runs on `YATUBE_HOST:YATUBE_PORT` (default 0.0.0.0:8000) backed by
/// PostgreSQL and, in production, Redis for the page cache and sessions.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: no .env file loaded ({e})");
    }

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting yatube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let mut db_cfg = DbPoolConfig::from_env("yatube-service").unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    db_cfg.service_name = "yatube-service".to_string();
    db_cfg.max_connections = config.database.max_connections;
    db_cfg.min_connections = db_cfg.min_connections.min(db_cfg.max_connections);

    db_cfg.log_config();
    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    db::run_migrations(&db_pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to run database migrations: {e}"),
        )
    })?;

    let cache = connect_cache(&config).await?;
    if let Err(e) = CacheMetrics::register(prometheus::default_registry()) {
        tracing::warn!("Cache metrics registration skipped: {}", e);
    }

    let settings = Settings::from(&config);
    let state = web::Data::new(AppState::new(
        Arc::new(PgStore::new(db_pool)),
        cache,
        &settings,
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || build_app(state.clone()))
        .workers(config.app.workers.max(1))
        .bind(&bind_address)?
        .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await?;
    tracing::info!("yatube-service stopped");
    Ok(())
}
