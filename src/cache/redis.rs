//! Redis-backed cache shared across proxy instances.

use std::fmt;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::cache::{CacheError, CacheResult, CacheStore};

/// Redis cache using a `ConnectionManager` for automatic reconnection.
#[derive(Clone)]
pub struct RedisCache {
    conn_manager: ConnectionManager,
    key_prefix: String,
    redis_url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redis_url)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    pub async fn connect(redis_url: &str, key_prefix: &str) -> CacheResult<Self> {
        tracing::info!(redis_url = %redis_url, "Connecting to redis");
        let client = redis::Client::open(redis_url).map_err(backend)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(backend)?;
        Ok(Self {
            conn_manager,
            key_prefix: key_prefix.to_string(),
            redis_url: redis_url.to_string(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

fn backend(e: redis::RedisError) -> CacheError {
    CacheError::Backend(e.to_string())
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn_manager.clone();
        conn.get::<_, Option<String>>(self.full_key(key))
            .await
            .map_err(backend)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        conn.set_ex::<_, _, ()>(self.full_key(key), value, ttl_secs)
            .await
            .map_err(backend)
    }
}
