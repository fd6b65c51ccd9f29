//! Startup orchestration.
//!
//! # Responsibilities
//! - Build collaborators from configuration in dependency order:
//!   cache → upstream client → OAuth provider → handler
//! - Assemble the shared application state
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use thiserror::Error;

use crate::auth::{CredentialStore, RedditOAuth};
use crate::cache::{CacheError, CacheStore, DisabledCache, MemoryCache, RedisCache};
use crate::config::{CacheBackend, CacheConfig, ConfigError, ProxyConfig};
use crate::http::AppState;
use crate::proxy::{HandlerSettings, ProxyHandler};
use crate::upstream::ReqwestTransport;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cache initialization failed: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP client initialization failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Construct the configured cache store.
pub async fn build_cache(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, StartupError> {
    let cache: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.max_entries)),
        CacheBackend::Redis => Arc::new(RedisCache::connect(&config.redis_url, &config.key_prefix).await?),
        CacheBackend::Disabled => Arc::new(DisabledCache),
    };
    tracing::info!(backend = ?config.backend, ttl_secs = config.ttl_secs, "Cache initialized");
    Ok(cache)
}

/// Build the full application state from configuration.
pub async fn build_state(config: &ProxyConfig) -> Result<AppState, StartupError> {
    let cache = build_cache(&config.cache).await?;

    let client = ReqwestTransport::build_client(config.timeouts.connect_secs, config.timeouts.upstream_secs)?;
    let transport = Arc::new(ReqwestTransport::new(client.clone()));

    let oauth = Arc::new(RedditOAuth::new(
        client,
        config.auth.clone(),
        config.upstream.user_agent.clone(),
    ));
    if oauth.is_configured() {
        tracing::info!(scopes = ?config.auth.scopes, "OAuth enabled");
    } else {
        tracing::info!("OAuth disabled, serving public mode only");
    }

    let handler = ProxyHandler::new(
        HandlerSettings::from_config(config),
        cache,
        oauth.clone(),
        transport,
    );

    Ok(AppState {
        handler,
        oauth,
        credentials: CredentialStore::new(),
    })
}
