//! OAuth routes: login redirect, code callback, logout, status.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::request::session_id;
use crate::http::response::json_error;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub expires_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub expires_at: Option<u64>,
}

fn not_configured() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "OAuth not configured",
        "set auth.enabled and auth.client_id to enable login",
    )
}

pub async fn login(State(state): State<AppState>) -> Response {
    if !state.oauth.is_configured() {
        return not_configured();
    }

    let Some(oauth_state) = state.credentials.issue_state() else {
        tracing::warn!("Too many pending logins, refusing new one");
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Login unavailable",
            "too many pending logins",
        );
    };
    match state.oauth.authorize_url(&oauth_state) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build authorize URL");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Login unavailable", e.to_string())
        }
    }
}

pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if !state.oauth.is_configured() {
        return not_configured();
    }
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Authorization denied by user or provider");
        return json_error(StatusCode::BAD_REQUEST, "Authorization denied", error);
    }

    let state_valid = query
        .state
        .as_deref()
        .is_some_and(|s| state.credentials.consume_state(s));
    if !state_valid {
        tracing::warn!("OAuth callback with unknown or expired state");
        return json_error(StatusCode::BAD_REQUEST, "Invalid OAuth state", "state mismatch");
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing authorization code", "code is required");
    };

    match state.oauth.exchange_code(&code).await {
        Ok(credential) => {
            let expires_at = credential.expires_at;
            let session_id = state.credentials.insert(credential);
            tracing::info!(sessions = state.credentials.count(), "Session created");
            Json(SessionCreated {
                session_id,
                expires_at,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Token exchange failed");
            json_error(StatusCode::BAD_GATEWAY, "Token exchange failed", e.to_string())
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(id) = session_id(&headers) {
        if state.credentials.remove(&id).is_some() {
            tracing::info!("Session removed");
        }
    }
    StatusCode::NO_CONTENT
}

pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionStatus> {
    let credential = session_id(&headers).and_then(|id| state.credentials.get(&id));
    Json(SessionStatus {
        authenticated: credential.is_some(),
        expires_at: credential.map(|c| c.expires_at),
    })
}
