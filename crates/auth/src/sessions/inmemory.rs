//! In-memory session storage for development and testing.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gatehouse_core::store::{Result, SessionStore};
use lru::LruCache;
use tokio::sync::RwLock;

/// Default capacity before least-recently-used entries are evicted.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory session store with LRU eviction.
///
/// Entries expire lazily: an expired entry reads as absent and is dropped
/// when touched. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<LruCache<String, Entry>>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemorySessionStore {
    /// Creates a store holding at most `max_entries` keys (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Remaining lifetime of `key`, if present and unexpired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .peek(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.put(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.pop(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .pop(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }
}
