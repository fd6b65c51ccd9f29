//! Reddit OAuth2 authorization-code client.
//!
//! # Responsibilities
//! - Build the authorize URL users are redirected to
//! - Exchange authorization codes for token sets
//! - Refresh expired access tokens
//!
//! # Design Decisions
//! - Client credentials travel as HTTP basic auth, grants as form bodies
//! - A refresh response without a refresh token keeps the previous one

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use url::Url;

use crate::auth::credential::{now_secs, CredentialError, CredentialProvider, CredentialState};
use crate::config::AuthConfig;
use crate::observability::metrics;

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_credential(self, previous_refresh: Option<&str>) -> CredentialState {
        CredentialState {
            access_token: self.access_token,
            expires_at: now_secs().saturating_add(self.expires_in),
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
        }
    }
}

/// OAuth client for Reddit, also acting as the proxy's credential provider.
#[derive(Clone)]
pub struct RedditOAuth {
    client: reqwest::Client,
    config: AuthConfig,
    user_agent: String,
}

impl RedditOAuth {
    pub fn new(client: reqwest::Client, config: AuthConfig, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            config,
            user_agent: user_agent.into(),
        }
    }

    /// Whether OAuth routes can be served.
    pub fn is_configured(&self) -> bool {
        self.config.enabled && !self.config.client_id.is_empty()
    }

    /// URL the user is sent to in order to grant access.
    pub fn authorize_url(&self, state: &str) -> Result<Url, CredentialError> {
        if !self.is_configured() {
            return Err(CredentialError::NotConfigured);
        }
        let mut url = Url::parse(&self.config.authorize_url)
            .map_err(|e| CredentialError::Transport(format!("invalid authorize URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("duration", "permanent")
            .append_pair("scope", &self.config.scopes.join(" "));
        Ok(url)
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<CredentialState, CredentialError> {
        if !self.is_configured() {
            return Err(CredentialError::NotConfigured);
        }
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;
        tracing::info!(expires_in = token.expires_in, "Authorization code exchanged");
        Ok(token.into_credential(None))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, CredentialError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(USER_AGENT, &self.user_agent)
            .form(form)
            .send()
            .await
            .map_err(|e| CredentialError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| CredentialError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CredentialProvider for RedditOAuth {
    fn is_valid(&self, credential: &CredentialState) -> bool {
        credential.is_fresh(self.config.expiry_margin_secs)
    }

    async fn refresh(&self, credential: &CredentialState) -> Result<CredentialState, CredentialError> {
        if !self.is_configured() {
            return Err(CredentialError::NotConfigured);
        }
        let refresh_token = match credential.refresh_token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(CredentialError::NotRefreshable),
        };

        let result = self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await;

        match result {
            Ok(token) => {
                metrics::record_token_refresh("success");
                Ok(token.into_credential(Some(refresh_token)))
            }
            Err(e) => {
                metrics::record_token_refresh("failure");
                Err(e)
            }
        }
    }
}
