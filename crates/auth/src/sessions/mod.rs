//! Session store backends.
//!
//! - `MemorySessionStore`: LRU-bounded in-process store, always available
//! - `RedisSessionStore`: Redis via fred (requires `redis` feature)

mod inmemory;
#[cfg(feature = "redis")]
mod redis_impl;

pub use inmemory::MemorySessionStore;
#[cfg(feature = "redis")]
pub use redis_impl::RedisSessionStore;
