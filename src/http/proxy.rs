//! `GET /api/reddit/r/{subreddit}/top` — the proxied listing route.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::http::request::{request_id, session_id, X_CACHE};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::ProxyRequest;

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<u32>,
    pub after: Option<String>,
}

pub async fn top_posts(
    State(state): State<AppState>,
    Path(subreddit): Path<String>,
    Query(query): Query<TopQuery>,
    headers: HeaderMap,
) -> Response {
    let request = match ProxyRequest::new(subreddit, query.limit, query.after) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let session = session_id(&headers);
    let credential = session.as_deref().and_then(|id| state.credentials.get(id));
    let requested_mode = if credential.is_some() { "authenticated" } else { "public" };

    tracing::debug!(
        request_id = %request_id(&headers),
        subreddit = %request.subreddit(),
        limit = request.limit(),
        has_session = credential.is_some(),
        "Proxying listing request"
    );

    match state.handler.handle(&request, credential.as_ref()).await {
        Ok(proxied) => {
            if let (Some(id), Some(renewed)) = (session.as_deref(), proxied.refreshed) {
                state.credentials.update(id, renewed);
            }
            metrics::record_request(proxied.mode.as_str(), 200);

            let mut response = Json(proxied.body).into_response();
            response
                .headers_mut()
                .insert(X_CACHE, HeaderValue::from_static(proxied.cache.as_str()));
            response
        }
        Err(e) => {
            metrics::record_request(requested_mode, e.status().as_u16());
            e.into_response()
        }
    }
}
