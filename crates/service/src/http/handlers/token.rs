use axum::extract::{Json, Query, State};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::upload::{self, UploadError, UploadRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUpload {
    /// Presigned PUT; the browser must send `x-amz-acl: public-read` with it
    #[serde(rename = "signedRequest")]
    pub signed_request: String,
    /// Where the object will be readable once uploaded
    pub url: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    WithRejection(Query(req), _): WithRejection<Query<UploadRequest>, UploadError>,
) -> Result<Json<SignedUpload>, UploadError> {
    let key = upload::prepare_key(state.config(), state.listing(), &req).await?;
    let credential = state.issuer().presigned_put(&key, Utc::now()).await?;

    tracing::info!(key = %credential.key, expires_at = %credential.expires_at, "presigned upload issued");

    Ok(Json(SignedUpload {
        signed_request: credential.grant.url,
        url: state.config().object_url(&credential.key),
    }))
}
