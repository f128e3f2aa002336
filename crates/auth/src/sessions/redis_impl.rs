//! Redis session storage implementation.

use std::time::Duration;

use async_trait::async_trait;
use fred::prelude::*;
use gatehouse_core::store::{Result, SessionStore, StoreError};

/// Redis-backed session storage.
///
/// `take` maps to `GETDEL`, so concurrent consumers of the same key cannot
/// both observe it. Requires Redis 6.2 or later.
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Connects a pool of `pool_size` clients to `url`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self> {
        let config = Config::from_url(url).map_err(connection_error)?;
        let pool = Builder::from_config(config)
            .build_pool(pool_size.max(1))
            .map_err(connection_error)?;
        pool.init().await.map_err(connection_error)?;

        tracing::info!(pool_size, "Connected to Redis");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

fn connection_error(err: Error) -> StoreError {
    StoreError::ConnectionFailed(err.to_string())
}

/// Maps fred errors to StoreError.
fn map_redis_error(err: Error) -> StoreError {
    match err.kind() {
        ErrorKind::IO | ErrorKind::Timeout | ErrorKind::Canceled => {
            StoreError::ConnectionFailed(err.to_string())
        }
        _ => StoreError::OperationFailed(err.to_string()),
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl_secs = ttl.as_secs().max(1) as i64;

        self.pool
            .set::<(), _, _>(key, value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(map_redis_error)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.pool.get(key).await.map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.pool
            .del::<(), _>(key)
            .await
            .map_err(map_redis_error)
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        self.pool.getdel(key).await.map_err(map_redis_error)
    }
}
