//! Response helpers.
//!
//! # Responsibilities
//! - Render non-proxy failures with the same `{error, details}` envelope
//!   the proxy handler uses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub fn json_error(status: StatusCode, error: &str, details: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "details": details.into(),
        })),
    )
        .into_response()
}
