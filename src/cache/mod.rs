//! Response cache subsystem.
//!
//! Provides a [`CacheStore`] trait with three implementations:
//! - [`MemoryCache`] - in-process DashMap with per-entry deadlines
//! - [`RedisCache`] - shared Redis-backed cache using `SET EX`
//! - [`DisabledCache`] - always misses, for deployments without caching
//!
//! # Design Decisions
//! - Values are opaque strings (serialized JSON); decoding is the caller's job
//! - Failures surface as [`CacheError`] and callers decide how to degrade

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache is full")]
    Full,

    #[error("cache call exceeded {0:?}")]
    Timeout(std::time::Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-entry time-to-live.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()>;
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl_secs: u64) -> CacheResult<()> {
        Ok(())
    }
}
