//! Authenticated-or-cached proxy request handler.
//!
//! # Flow
//! ```text
//! credential? ──valid──────────────▶ authenticated plan ──▶ fetch ──▶ return
//!      │ expired → refresh once ──ok─┘
//!      │            └─fail─┐
//!      └─none──────────────┴──────▶ public plan ──▶ cache hit? ──▶ return
//!                                                    └─miss ──▶ fetch ──▶ cache write ──▶ return
//! ```
//!
//! Cache and refresh failures degrade; only upstream, transport, and
//! credential-without-fallback errors reach the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::Value;

use crate::auth::{CredentialProvider, CredentialState};
use crate::cache::{CacheError, CacheResult, CacheStore};
use crate::config::{ProxyConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::plan::{Mode, RequestPlan};
use crate::proxy::request::ProxyRequest;
use crate::upstream::Transport;

/// Read-only settings shared by every request.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub upstream: UpstreamConfig,
    pub cache_ttl_secs: u64,
    /// Deadline for each cache read or write.
    pub cache_timeout: Duration,
    pub public_fallback: bool,
}

impl HandlerSettings {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            upstream: config.upstream.clone(),
            cache_ttl_secs: config.cache.ttl_secs,
            cache_timeout: Duration::from_millis(config.timeouts.cache_ms),
            public_fallback: config.auth.public_fallback,
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::from_config(&ProxyConfig::default())
    }
}

/// Where a successful payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Authenticated request, cache not consulted.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// Successful handler outcome.
#[derive(Debug, Clone)]
pub struct Proxied {
    pub body: Value,
    pub mode: Mode,
    pub cache: CacheStatus,
    /// New token set when the supplied credential was refreshed.
    pub refreshed: Option<CredentialState>,
}

#[derive(Clone)]
pub struct ProxyHandler {
    settings: Arc<HandlerSettings>,
    cache: Arc<dyn CacheStore>,
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn Transport>,
}

impl ProxyHandler {
    pub fn new(
        settings: HandlerSettings,
        cache: Arc<dyn CacheStore>,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            cache,
            credentials,
            transport,
        }
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Flatten [`handle`](Self::handle) into a status and JSON body.
    pub async fn respond(
        &self,
        request: &ProxyRequest,
        credential: Option<&CredentialState>,
    ) -> (StatusCode, Value) {
        match self.handle(request, credential).await {
            Ok(proxied) => (StatusCode::OK, proxied.body),
            Err(e) => (e.status(), e.body()),
        }
    }

    pub async fn handle(
        &self,
        request: &ProxyRequest,
        credential: Option<&CredentialState>,
    ) -> Result<Proxied, ProxyError> {
        let (token, refreshed) = self.select_credential(credential).await?;
        let plan = RequestPlan::build(&self.settings.upstream, request, token.as_deref())?;

        tracing::debug!(
            subreddit = %request.subreddit(),
            mode = plan.mode.as_str(),
            cache_key = %plan.cache_key,
            "Planned upstream request"
        );

        if plan.cacheable {
            if let Some(body) = self.lookup(&plan.cache_key).await {
                return Ok(Proxied {
                    body,
                    mode: plan.mode,
                    cache: CacheStatus::Hit,
                    refreshed,
                });
            }
        }

        let (body, raw) = self.fetch(&plan).await?;

        if plan.cacheable && !is_empty_payload(&body) {
            self.store(&plan.cache_key, raw).await;
        }

        Ok(Proxied {
            body,
            mode: plan.mode,
            cache: if plan.cacheable { CacheStatus::Miss } else { CacheStatus::Bypass },
            refreshed,
        })
    }

    /// Returns the access token to use (if any) and a refreshed credential (if one was obtained).
    async fn select_credential(
        &self,
        credential: Option<&CredentialState>,
    ) -> Result<(Option<String>, Option<CredentialState>), ProxyError> {
        let Some(credential) = credential else {
            return Ok((None, None));
        };

        if self.credentials.is_valid(credential) {
            return Ok((Some(credential.access_token.clone()), None));
        }

        match self.credentials.refresh(credential).await {
            Ok(renewed) => {
                tracing::info!(expires_at = renewed.expires_at, "Access token refreshed");
                Ok((Some(renewed.access_token.clone()), Some(renewed)))
            }
            Err(e) if self.settings.public_fallback => {
                tracing::warn!(error = %e, "Token refresh failed, falling back to public mode");
                Ok((None, None))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed and public fallback is disabled");
                Err(ProxyError::Unauthorized(e.to_string()))
            }
        }
    }

    async fn lookup(&self, key: &str) -> Option<Value> {
        match self.bounded(self.cache.get(key)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(cache_key = %key, "Cache hit");
                    metrics::record_cache_event("hit");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(cache_key = %key, error = %e, "Undecodable cache entry, treating as miss");
                    metrics::record_cache_event("error");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(cache_key = %key, "Cache miss");
                metrics::record_cache_event("miss");
                None
            }
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Cache read failed, treating as miss");
                metrics::record_cache_event("error");
                None
            }
        }
    }

    /// A cache that stalls is treated like one that fails.
    async fn bounded<T>(&self, call: impl Future<Output = CacheResult<T>>) -> CacheResult<T> {
        let deadline = self.settings.cache_timeout;
        tokio::time::timeout(deadline, call)
            .await
            .unwrap_or(Err(CacheError::Timeout(deadline)))
    }

    /// Returns the parsed payload and the upstream text it came from.
    async fn fetch(&self, plan: &RequestPlan) -> Result<(Value, String), ProxyError> {
        let start = Instant::now();
        let response = self
            .transport
            .get(&plan.url, &plan.headers)
            .await
            .map_err(|e| {
                tracing::error!(url = %plan.url, error = %e, "Upstream request failed");
                ProxyError::Transport(e.to_string())
            })?;
        metrics::record_upstream_latency(start);

        if !response.status.is_success() {
            tracing::warn!(url = %plan.url, status = %response.status, "Upstream returned error status");
            return Err(ProxyError::upstream(response.status, &response.body));
        }

        let body = serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(url = %plan.url, error = %e, "Upstream body is not JSON");
            ProxyError::Transport(format!("invalid JSON from upstream: {}", e))
        })?;
        Ok((body, response.body))
    }

    async fn store(&self, key: &str, raw: String) {
        match self.bounded(self.cache.set(key, raw, self.settings.cache_ttl_secs)).await {
            Ok(()) => metrics::record_cache_event("write"),
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Cache write failed");
                metrics::record_cache_event("error");
            }
        }
    }
}

/// `null`, `{}`, `[]`, and `""` are not worth caching.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
