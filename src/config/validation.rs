//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, TTL > 0)
//! - Check that URLs and addresses parse
//! - Check that enabled features carry the settings they need
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{CacheBackend, ProxyConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for (field, value) in [
        ("upstream.public_base_url", &config.upstream.public_base_url),
        ("upstream.oauth_base_url", &config.upstream.oauth_base_url),
    ] {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::new(field, format!("'{}' is not a valid URL", value)));
        }
    }

    if config.upstream.user_agent.trim().is_empty() {
        errors.push(ValidationError::new("upstream.user_agent", "must not be empty"));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be greater than 0"));
    }

    if config.cache.backend == CacheBackend::Redis && config.cache.redis_url.trim().is_empty() {
        errors.push(ValidationError::new("cache.redis_url", "required for the redis backend"));
    }

    if config.auth.enabled {
        if config.auth.client_id.trim().is_empty() {
            errors.push(ValidationError::new("auth.client_id", "required when auth is enabled"));
        }
        for (field, value) in [
            ("auth.redirect_uri", &config.auth.redirect_uri),
            ("auth.authorize_url", &config.auth.authorize_url),
            ("auth.token_url", &config.auth.token_url),
        ] {
            if url::Url::parse(value).is_err() {
                errors.push(ValidationError::new(field, format!("'{}' is not a valid URL", value)));
            }
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.cache_ms == 0 {
        errors.push(ValidationError::new("timeouts.cache_ms", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.cache.ttl_secs = 0;
        config.auth.enabled = true;
        config.auth.client_id = String::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();

        assert_eq!(errors.len(), 3, "got {:?}", errors);
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"cache.ttl_secs"));
        assert!(fields.contains(&"auth.client_id"));
    }

    #[test]
    fn test_cache_deadline_must_be_positive() {
        let mut config = ProxyConfig::default();
        config.timeouts.cache_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "timeouts.cache_ms");
    }

    #[test]
    fn test_auth_urls_ignored_when_disabled() {
        let mut config = ProxyConfig::default();
        config.auth.token_url = "::".into();
        assert!(validate_config(&config).is_ok());

        config.auth.enabled = true;
        config.auth.client_id = "id".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.token_url");
    }
}
