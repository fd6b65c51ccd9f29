//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the Reddit proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Reddit API endpoints and identification.
    pub upstream: UpstreamConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// OAuth2 settings for authenticated mode.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (Reddit API) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Host used for unauthenticated requests.
    pub public_base_url: String,

    /// Host used when a bearer token is attached.
    pub oauth_base_url: String,

    /// User-Agent sent with every upstream request.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            public_base_url: "https://www.reddit.com".to_string(),
            oauth_base_url: "https://oauth.reddit.com".to_string(),
            user_agent: concat!("reddit-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Which cache store backs public responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
    Disabled,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Time-to-live for cached listings, in seconds.
    pub ttl_secs: u64,

    /// Redis connection URL (only for the redis backend).
    pub redis_url: String,

    /// Prefix prepended to every redis key.
    pub key_prefix: String,

    /// Upper bound on in-memory entries (0 = unbounded).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl_secs: 300,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: String::new(),
            max_entries: 10_000,
        }
    }
}

/// OAuth2 (authorization code) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable the OAuth routes and authenticated mode.
    pub enabled: bool,

    pub client_id: String,

    /// Prefer the REDDIT_CLIENT_SECRET environment variable over this field.
    pub client_secret: String,

    pub redirect_uri: String,

    pub authorize_url: String,

    pub token_url: String,

    pub scopes: Vec<String>,

    /// Tokens expiring within this many seconds are treated as expired.
    pub expiry_margin_secs: u64,

    /// Serve public responses when a credential cannot be used.
    pub public_fallback: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/auth/callback".to_string(),
            authorize_url: "https://www.reddit.com/api/v1/authorize".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            scopes: vec!["identity".to_string(), "read".to_string()],
            expiry_margin_secs: 60,
            public_fallback: true,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream request timeout in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Deadline for a single cache read or write in milliseconds.
    pub cache_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 15,
            request_secs: 30,
            cache_ms: 250,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [cache]
            backend = "redis"
            ttl_secs = 120

            [auth]
            enabled = true
            client_id = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.cache.redis_url, "redis://127.0.0.1:6379");
        assert!(config.auth.enabled);
        assert_eq!(config.auth.expiry_margin_secs, 60);
        assert_eq!(config.upstream.public_base_url, "https://www.reddit.com");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
