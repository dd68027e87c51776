//! Authentication middleware: an API key header for the JSON API and HTTP
//! Basic auth for the operator pages. Both compare against the same
//! configured key, and an empty configured key locks everything rather than
//! opening it.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use serde_json::json;

use super::AppState;

/// Header clients must send on every `/api` request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `x-api-key` header does not match the configured
/// key. An empty configured key locks the API entirely rather than opening
/// it.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let expected = state.settings.api_key.as_str();
    if expected.is_empty() || provided != Some(expected) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing or invalid x-api-key" })),
        )
            .into_response();
    }

    next.run(request).await
}

/// Challenge browsers for credentials on the operator pages. Any username is
/// accepted; the password must match the configured API key.
pub async fn require_operator_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = state.settings.api_key.as_str();
    if !expected.is_empty() && basic_password(request.headers()).as_deref() == Some(expected) {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"terrascope\"")],
        "authentication required",
    )
        .into_response()
}

fn basic_password(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_, password) = decoded.split_once(':')?;
    Some(password.to_string())
}
