use axum::extract::State;
use axum::response::Response;
use http::StatusCode;

use crate::http::render::{render, IndexTemplate, PageContext};
use crate::ServiceState;

pub async fn handler(State(state): State<ServiceState>) -> Response {
    let page = PageContext::from_config(state.config());
    render(StatusCode::OK, &IndexTemplate { page })
}
