use axum::routing::get;
use axum::Router;

use crate::ServiceState;

mod livez;
mod version;

/// Ungated status routes, nested under `/_status`.
pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(livez::handler))
        .route("/version", get(version::handler))
}
