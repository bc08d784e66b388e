//! Seams to the object store and identity provider.
//!
//! The request pipeline only ever talks to these traits; `S3Bucket` and
//! `StsFederation` are the AWS-backed implementations.

use std::time::Duration;

use async_trait::async_trait;

mod s3;
mod sts;

pub use s3::S3Bucket;
pub use sts::StsFederation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("error listing objects: {0}")]
    List(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
    #[error("error presigning request: {0}")]
    Presign(String),
    #[error("error requesting federation token: {0}")]
    Federation(String),
    #[error("identity provider returned no credentials")]
    MissingCredentials,
    #[error("credential lifetime {0:?} is out of range")]
    InvalidDuration(Duration),
}

/// Access key triple of a temporary identity.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl std::fmt::Debug for TemporaryKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryKeys")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ObjectListing: Send + Sync {
    /// Every key in the bucket starting with `prefix` (a plain string prefix,
    /// not a directory).
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
pub trait RequestPresigner: Send + Sync {
    /// URL authorising one public-read PUT of `key`, valid for `expires_in`.
    async fn presign_put(&self, key: &str, expires_in: Duration) -> Result<String, IssueError>;
}

#[async_trait]
pub trait FederationTokens: Send + Sync {
    /// Temporary credentials for identity `name`, restricted by the JSON
    /// `policy`, lasting `duration`.
    async fn federation_token(
        &self,
        name: &str,
        policy: &str,
        duration: Duration,
    ) -> Result<TemporaryKeys, IssueError>;
}
