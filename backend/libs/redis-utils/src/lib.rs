use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Start-up connection policy.
#[derive(Clone, Debug)]
pub struct ConnectPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

/// Redis connection holder.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    /// Connect with the default retry policy.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        Self::connect_with_policy(redis_url, ConnectPolicy::default()).await
    }

    /// Connect, retrying with doubling backoff while Redis is not reachable yet.
    pub async fn connect_with_policy(redis_url: &str, policy: ConnectPolicy) -> Result<Self> {
        let info = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;
        let client = Client::open(info).context("failed to construct Redis client")?;

        let mut backoff = policy.initial_backoff;
        let mut attempt = 1;
        loop {
            match ConnectionManager::new(client.clone()).await {
                Ok(manager) => {
                    info!(attempt, "Redis connection manager initialized");
                    return Ok(Self {
                        manager: Arc::new(Mutex::new(manager)),
                    });
                }
                Err(err) if attempt < policy.attempts => {
                    warn!(
                        attempt,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "Redis not reachable yet, retrying"
                    );
                    sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err).context("failed to initialize Redis connection manager");
                }
            }
        }
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}
