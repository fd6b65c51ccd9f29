//! Request-level plumbing.
//!
//! # Responsibilities
//! - Generate and propagate a unique request ID (UUID v4) on `x-request-id`
//! - Extract the session id that names a stored credential
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as-is

use axum::http::{HeaderMap, HeaderName};

pub use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_SESSION_ID: HeaderName = HeaderName::from_static("x-session-id");
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Session id presented by the client, if any.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Request id assigned by [`SetRequestIdLayer`], or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
