use axum::extract::{Json, Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::http::render::{render, BurnerTemplate, PageContext};
use crate::upload::{self, FederatedIdentity, IssuedCredential, UploadError, UploadRequest};
use crate::ServiceState;

/// Expiry as shown on the instructions page, e.g. `Sun Mar 10 07:05:42 +0000 2024`.
const EXPIRY_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnerCredentials {
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: String,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: String,
    #[serde(rename = "AWS_SESSION_TOKEN")]
    pub session_token: String,
    pub expiration: DateTime<Utc>,
    pub path: String,
    pub url: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    WithRejection(Query(req), _): WithRejection<Query<UploadRequest>, UploadError>,
) -> Result<Response, UploadError> {
    if !state.config().enable_burner_credentials {
        return Err(UploadError::BurnerDisabled);
    }

    let key = upload::prepare_key(state.config(), state.listing(), &req).await?;
    let credential = state.issuer().federation_token(&key, Utc::now()).await?;

    tracing::info!(
        key = %credential.key,
        username = %credential.grant.username,
        expires_at = %credential.expires_at,
        "burner credentials issued"
    );

    if req.wants_json() {
        let url = state.config().object_url(&credential.key);
        return Ok(Json(BurnerCredentials {
            access_key_id: credential.grant.keys.access_key_id,
            secret_access_key: credential.grant.keys.secret_access_key,
            session_token: credential.grant.keys.session_token,
            expiration: credential.expires_at,
            path: credential.key,
            url,
        })
        .into_response());
    }

    Ok(render(StatusCode::OK, &instructions_page(&state, credential)))
}

fn instructions_page(
    state: &ServiceState,
    credential: IssuedCredential<FederatedIdentity>,
) -> BurnerTemplate {
    let config = state.config();
    BurnerTemplate {
        page: PageContext::from_config(config),
        bucket: config.bucket.clone(),
        region: config.region.clone(),
        filename: file_name(&credential.key).to_string(),
        expiry: credential.expires_at.format(EXPIRY_FORMAT).to_string(),
        path: credential.key,
        access_key_id: credential.grant.keys.access_key_id,
        secret_access_key: credential.grant.keys.secret_access_key,
        session_token: credential.grant.keys.session_token,
    }
}

fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
