//! Credential types and the provider contract consumed by the proxy handler.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user's OAuth token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialState {
    pub access_token: String,
    /// Expiry timestamp (seconds since epoch).
    pub expires_at: u64,
    pub refresh_token: Option<String>,
}

impl CredentialState {
    /// True while `now` is before the expiry minus the safety margin.
    pub fn is_fresh(&self, margin_secs: u64) -> bool {
        self.expires_at.saturating_sub(margin_secs) > now_secs()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Current unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Errors that can occur while obtaining or refreshing tokens.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No refresh token is available for this credential.
    #[error("credential has no refresh token")]
    NotRefreshable,

    /// OAuth client is not configured.
    #[error("OAuth client not configured")]
    NotConfigured,

    /// Token endpoint rejected the request.
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Network failure or malformed token response.
    #[error("token request failed: {0}")]
    Transport(String),
}

/// Decides whether a credential is usable and renews expired ones.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn is_valid(&self, credential: &CredentialState) -> bool;

    async fn refresh(&self, credential: &CredentialState) -> Result<CredentialState, CredentialError>;
}
