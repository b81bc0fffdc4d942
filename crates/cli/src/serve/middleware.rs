//! HTTP middleware: API key authentication.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::state::AppState;

/// Extract the presented key from `Authorization: Bearer <key>` or, failing
/// that, `X-API-Key: <key>`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()))
}

/// API key authentication middleware.
///
/// When a key is configured, every request except `/health` must present
/// it. A missing key is 401; a wrong key is 403.
pub(crate) async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = &state.api_key else {
        return next.run(request).await;
    };
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let rejection = match presented_key(request.headers()) {
        Some(key) if key == expected => None,
        Some(_) => Some((StatusCode::FORBIDDEN, "invalid API key")),
        None => Some((StatusCode::UNAUTHORIZED, "authentication required")),
    };
    match rejection {
        None => next.run(request).await,
        Some((status, message)) => {
            tracing::warn!(path = %request.uri().path(), %status, "rejected request");
            super::json_error(status, message).into_response()
        }
    }
}
