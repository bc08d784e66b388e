//! The upload pipeline: path policy, collision avoidance, scope documents
//! and credential issuance.

use serde::Deserialize;

pub mod collision;
pub mod credentials;
pub mod path_policy;
pub mod scope;

pub use credentials::{
    CredentialError, CredentialIssuer, FederatedIdentity, IssuedCredential, PresignedUrl,
};
pub use path_policy::PathError;
pub use scope::{ScopeDocument, ScopeError};

use crate::config::ServerConfig;
use crate::upstream::{IssueError, ObjectListing, StoreError};

/// Query parameters accepted by the credential endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl UploadRequest {
    pub fn wants_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid query string: {0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Issue(#[from] IssueError),
    #[error("this server does not support burner credentials")]
    BurnerDisabled,
}

impl From<CredentialError> for UploadError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Scope(e) => UploadError::Scope(e),
            CredentialError::Issue(e) => UploadError::Issue(e),
        }
    }
}

/// Validate the requested location and pick a key that is free right now.
pub async fn prepare_key(
    config: &ServerConfig,
    listing: &dyn ObjectListing,
    request: &UploadRequest,
) -> Result<String, UploadError> {
    let candidate = path_policy::resolve(
        &config.upload_dirs,
        request.dir.as_deref(),
        &request.object_name,
    )?;
    let key = collision::resolve_free_key(listing, &candidate).await?;
    Ok(key)
}
