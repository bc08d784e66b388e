use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::render::{render, NotFoundTemplate, PageContext};
use crate::ServiceState;

pub async fn not_found_handler(State(state): State<ServiceState>, headers: HeaderMap) -> Response {
    let accept = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok());

    match accept {
        Some(accept_str) if accept_str.contains("application/json") => {
            let err_msg = serde_json::json!({"error": "not found"});
            (StatusCode::NOT_FOUND, Json(err_msg)).into_response()
        }
        _ => {
            let page = PageContext::from_config(state.config());
            render(StatusCode::NOT_FOUND, &NotFoundTemplate { page })
        }
    }
}
