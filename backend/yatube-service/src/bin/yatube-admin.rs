//! Operator tool: schema migrations, groups, cache and post removal.
//!
//! Usage:
//!   yatube-admin migrate
//!   yatube-admin create-group <slug> <title> [description]
//!   yatube-admin clear-cache
//!   yatube-admin delete-post <id>

use anyhow::{anyhow, bail, Context, Result};
use db_pool::{create_pool, DbConfig};
use redis_utils::RedisPool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_cache::RedisCache;
use yatube_service::cache::IndexPageCache;
use yatube_service::config::CacheBackendKind;
use yatube_service::db::{self, GroupRepository, PgStore};
use yatube_service::services::{MediaStorage, PostService};
use yatube_service::Config;

const USAGE: &str = "usage: yatube-admin <migrate | create-group <slug> <title> [description] | clear-cache | delete-post <id>>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Migrate,
    CreateGroup {
        slug: String,
        title: String,
        description: String,
    },
    ClearCache,
    DeletePost(i64),
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 50
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_command(args: &[String]) -> Result<Command> {
    let command = args.first().map(String::as_str).ok_or_else(|| anyhow!(USAGE))?;
    match command {
        "migrate" => Ok(Command::Migrate),
        "clear-cache" => Ok(Command::ClearCache),
        "create-group" => {
            let (slug, title) = match (args.get(1), args.get(2)) {
                (Some(slug), Some(title)) => (slug.clone(), title.clone()),
                _ => bail!(USAGE),
            };
            if !is_valid_slug(&slug) {
                bail!("slug must be 1-50 characters of letters, digits, '-' or '_'");
            }
            if title.chars().count() > 200 {
                bail!("title must be at most 200 characters");
            }
            Ok(Command::CreateGroup {
                slug,
                title,
                description: args.get(3).cloned().unwrap_or_default(),
            })
        }
        "delete-post" => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!(USAGE))?
                .parse::<i64>()
                .context("post id must be an integer")?;
            Ok(Command::DeletePost(id))
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

async fn connect_db(config: &Config) -> Result<PgStore> {
    let mut db_cfg = DbConfig::from_env("yatube-admin").unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    db_cfg.max_connections = 2;
    db_cfg.min_connections = 1;
    let pool = create_pool(db_cfg)
        .await
        .context("Failed to connect to PostgreSQL")?;
    Ok(PgStore::new(pool))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube_admin=info,yatube_service=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;
    let config = Config::from_env().map_err(|e| anyhow!(e))?;

    match command {
        Command::Migrate => {
            let store = connect_db(&config).await?;
            db::run_migrations(store.pool())
                .await
                .context("Migration failed")?;
            info!("Schema is up to date");
        }
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            let store = connect_db(&config).await?;
            match store.create_group(&slug, &title, &description).await? {
                Some(group) => info!(group_id = group.id, slug = %group.slug, "group created"),
                None => bail!("a group with slug '{}' already exists", slug),
            }
        }
        Command::ClearCache => match config.cache.backend {
            CacheBackendKind::Redis => {
                let redis = RedisPool::connect(&config.cache.url).await?;
                let cache = IndexPageCache::new(
                    Arc::new(RedisCache::new(redis.manager())),
                    config.cache.index_ttl_secs,
                );
                let removed = cache.clear().await?;
                info!(removed, "index page cache cleared");
            }
            CacheBackendKind::Memory => {
                warn!("CACHE_BACKEND=memory lives inside the server process; nothing to clear");
            }
        },
        Command::DeletePost(post_id) => {
            let store = connect_db(&config).await?;
            let media = MediaStorage::new(&config.media.root, config.media.max_upload_bytes);
            let posts = PostService::new(Arc::new(store), media);
            if !posts.delete(post_id).await? {
                bail!("post {} does not exist", post_id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_create_group() {
        assert_eq!(
            parse_command(&args(&["create-group", "cats", "Cats", "All about cats"])).unwrap(),
            Command::CreateGroup {
                slug: "cats".into(),
                title: "Cats".into(),
                description: "All about cats".into(),
            }
        );
        assert!(parse_command(&args(&["create-group", "bad slug", "Cats"])).is_err());
        assert!(parse_command(&args(&["create-group", "cats"])).is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command(&args(&["migrate"])).unwrap(), Command::Migrate);
        assert_eq!(
            parse_command(&args(&["clear-cache"])).unwrap(),
            Command::ClearCache
        );
        assert_eq!(
            parse_command(&args(&["delete-post", "42"])).unwrap(),
            Command::DeletePost(42)
        );
        assert!(parse_command(&args(&["delete-post", "x"])).is_err());
        assert!(parse_command(&args(&[])).is_err());
        assert!(parse_command(&args(&["drop-everything"])).is_err());
    }
}
