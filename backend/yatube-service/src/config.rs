/// Configuration management for the Yatube service
///
/// Everything is read from environment variables (a `.env` file is loaded
/// first by the binaries).
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache and session backend configuration
    pub cache: CacheConfig,
    /// Feed configuration
    pub feed: FeedConfig,
    /// Uploaded media configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// HTTP worker threads
    pub workers: usize,
    /// Mark session and CSRF cookies `Secure`
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

impl std::str::FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackendKind::Redis),
            "memory" => Ok(CacheBackendKind::Memory),
            other => Err(format!("unknown CACHE_BACKEND '{}'", other)),
        }
    }
}

/// Cache and session backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Redis URL, used when `backend` is redis
    pub url: String,
    /// Lifetime of a cached index page
    pub index_ttl_secs: u64,
    /// Lifetime of a login session
    pub session_ttl_secs: u64,
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts per feed page
    pub posts_per_page: i64,
}

/// Uploaded media configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written to
    pub root: String,
    /// Largest accepted upload
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("CACHE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) if is_production => CacheBackendKind::Redis,
            Err(_) => CacheBackendKind::Memory,
        };
        if is_production && backend == CacheBackendKind::Memory {
            return Err("CACHE_BACKEND=memory is not allowed in production".to_string());
        }

        let posts_per_page = parse_env_or_default("POSTS_PER_PAGE", 10i64)?;
        if posts_per_page < 1 {
            return Err(format!("POSTS_PER_PAGE must be positive, got {}", posts_per_page));
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("YATUBE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("YATUBE_PORT", 8000u16)?,
                workers: parse_env_or_default("YATUBE_WORKERS", 4usize)?,
                secure_cookies: parse_env_or_default("SECURE_COOKIES", is_production)?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/yatube".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10u32)?,
            },
            cache: CacheConfig {
                backend,
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                index_ttl_secs: parse_env_or_default(
                    "INDEX_CACHE_TTL_SECS",
                    yatube_cache::ttl::INDEX_PAGE,
                )?,
                session_ttl_secs: parse_env_or_default(
                    "SESSION_TTL_SECS",
                    yatube_cache::ttl::SESSION,
                )?,
            },
            feed: FeedConfig { posts_per_page },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                max_upload_bytes: parse_env_or_default("MAX_UPLOAD_BYTES", 5 * 1024 * 1024usize)?,
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "APP_ENV",
        "CACHE_BACKEND",
        "POSTS_PER_PAGE",
        "INDEX_CACHE_TTL_SECS",
        "SECURE_COOKIES",
        "YATUBE_PORT",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8000);
        assert!(!config.app.secure_cookies);
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache.index_ttl_secs, 20);
        assert_eq!(config.feed.posts_per_page, 10);
    }

    #[test]
    #[serial]
    fn test_production_requires_redis() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CACHE_BACKEND", "memory");
        assert!(Config::from_env().is_err());

        std::env::set_var("CACHE_BACKEND", "redis");
        let config = Config::from_env().unwrap();
        assert!(config.app.secure_cookies);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_reported() {
        clear_env();
        std::env::set_var("POSTS_PER_PAGE", "0");
        assert!(Config::from_env().is_err());

        std::env::set_var("POSTS_PER_PAGE", "ten");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("POSTS_PER_PAGE"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("POSTS_PER_PAGE", "3");
        std::env::set_var("INDEX_CACHE_TTL_SECS", "60");
        std::env::set_var("CACHE_BACKEND", "Redis");
        let config = Config::from_env().unwrap();
        assert_eq!(config.feed.posts_per_page, 3);
        assert_eq!(config.cache.index_ttl_secs, 60);
        assert_eq!(config.cache.backend, CacheBackendKind::Redis);
        clear_env();
    }
}
