//! CORS headers for allow-listed origins.
//!
//! Requests from other origins are served without CORS headers rather than
//! rejected; enforcing that is left to the browser.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::ServiceState;

const ALLOW_METHODS: &str = "GET, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Mirror `origin` back if it is in `allowed`.
pub fn apply_cors_headers(
    allowed: &[String],
    origin: Option<&HeaderValue>,
    headers: &mut HeaderMap,
) {
    let Some(origin) = origin else {
        return;
    };
    let Ok(origin_str) = origin.to_str() else {
        return;
    };
    if !allowed.iter().any(|candidate| candidate == origin_str) {
        tracing::debug!(origin = %origin_str, "origin not allowed, omitting CORS headers");
        return;
    }

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

/// Preflight for the credential endpoints. Not gated: browsers never send
/// credentials on a preflight.
pub async fn preflight_handler(State(state): State<ServiceState>, headers: HeaderMap) -> Response {
    let mut response = StatusCode::OK.into_response();
    apply_cors_headers(
        &state.config().allowed_origins,
        headers.get(ORIGIN),
        response.headers_mut(),
    );
    response
}
