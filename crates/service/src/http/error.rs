//! Maps pipeline failures onto HTTP responses.

use axum::extract::rejection::QueryRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use crate::upload::{PathError, UploadError};

impl UploadError {
    /// Directory problems keep answering 500 so existing clients see the
    /// same status they always have.
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::InvalidQuery(_) | UploadError::Path(PathError::MissingObjectName) => {
                StatusCode::BAD_REQUEST
            }
            UploadError::BurnerDisabled => StatusCode::NOT_FOUND,
            UploadError::Path(_)
            | UploadError::Store(_)
            | UploadError::Scope(_)
            | UploadError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for UploadError {
    fn from(rejection: QueryRejection) -> Self {
        UploadError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "upload request failed");
        } else {
            tracing::warn!(error = %self, "upload request refused");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
