use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key-value store holding OAuth state tokens and session records.
///
/// Values are JSON text (see [`encode`](super::encode)). Every write carries a
/// TTL; expired keys behave as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Sets `key` to `value`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Gets the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically gets and deletes `key`.
    ///
    /// Of any number of concurrent callers, at most one observes the value.
    async fn take(&self, key: &str) -> Result<Option<String>>;
}
