//! Errors surfaced to proxy callers and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Upper bound on the upstream body excerpt included in error details.
pub const MAX_ERROR_DETAIL_CHARS: usize = 1000;

/// Failures that reach the caller as non-200 responses.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream answered with a non-2xx status.
    #[error("Failed to fetch: {}", .status.as_u16())]
    Upstream { status: StatusCode, details: String },

    /// Network failure or an unparseable upstream body.
    #[error("Failed to fetch data")]
    Transport(String),

    /// Credential unusable and public fallback disabled.
    #[error("Authentication required")]
    Unauthorized(String),

    #[error("Invalid request")]
    InvalidRequest(String),
}

impl ProxyError {
    /// Build an upstream error, truncating the body excerpt.
    pub fn upstream(status: StatusCode, body: &str) -> Self {
        Self::Upstream {
            status,
            details: truncate_chars(body, MAX_ERROR_DETAIL_CHARS),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn details(&self) -> &str {
        match self {
            Self::Upstream { details, .. } => details,
            Self::Transport(d) | Self::Unauthorized(d) | Self::InvalidRequest(d) => d,
        }
    }

    /// `{error, details}` envelope.
    pub fn body(&self) -> Value {
        json!({
            "error": self.to_string(),
            "details": self.details(),
        })
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_envelope() {
        let err = ProxyError::upstream(StatusCode::TOO_MANY_REQUESTS, "rate limited");
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            err.body(),
            json!({"error": "Failed to fetch: 429", "details": "rate limited"})
        );
    }

    #[test]
    fn test_details_truncated() {
        let body = "é".repeat(1500);
        let err = ProxyError::upstream(StatusCode::BAD_GATEWAY, &body);
        assert_eq!(err.details().chars().count(), MAX_ERROR_DETAIL_CHARS);
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::Transport("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProxyError::InvalidRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }
}
