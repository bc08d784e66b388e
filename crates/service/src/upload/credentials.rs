//! Issues single-object credentials in one of two modes: a 24h federated
//! identity, or a 15 minute presigned PUT.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::scope::{ScopeDocument, ScopeError};
use crate::upstream::{FederationTokens, IssueError, RequestPresigner, TemporaryKeys};

pub const FEDERATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const PRESIGN_TTL: Duration = Duration::from_secs(15 * 60);

/// Temporary identity name derived from the current minute.
///
/// Names repeat within a minute; the scope document, not the name, is what
/// limits a credential.
pub fn federation_username(now: DateTime<Utc>) -> String {
    format!("user_{}", now.format("%Y_%m_%d_%H_%M"))
}

/// Identity minted by the federation-token flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub username: String,
    pub keys: TemporaryKeys,
}

/// Authorization produced by the presigned-request flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    pub url: String,
}

/// A credential good for exactly one object key, minted per request.
#[derive(Debug, Clone)]
pub struct IssuedCredential<G> {
    pub key: String,
    pub scope: ScopeDocument,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub grant: G,
}

impl<G> IssuedCredential<G> {
    pub fn ttl(&self) -> chrono::Duration {
        self.expires_at - self.issued_at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Issue(#[from] IssueError),
}

#[derive(Clone)]
pub struct CredentialIssuer {
    bucket: String,
    presigner: Arc<dyn RequestPresigner>,
    federation: Arc<dyn FederationTokens>,
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl CredentialIssuer {
    pub fn new(
        bucket: impl Into<String>,
        presigner: Arc<dyn RequestPresigner>,
        federation: Arc<dyn FederationTokens>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            presigner,
            federation,
        }
    }

    /// Request a federated identity that can only touch `key`.
    pub async fn federation_token(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential<FederatedIdentity>, CredentialError> {
        let scope = ScopeDocument::for_object(&self.bucket, key)?;
        let policy = scope.to_policy()?;
        let username = federation_username(now);

        tracing::info!(%key, %username, "issuing federation token");
        let keys = self
            .federation
            .federation_token(&username, &policy, FEDERATION_TTL)
            .await?;

        Ok(IssuedCredential {
            key: key.to_string(),
            scope,
            issued_at: now,
            expires_at: now + ttl(FEDERATION_TTL)?,
            grant: FederatedIdentity { username, keys },
        })
    }

    /// Presign a single public-read PUT of `key`.
    ///
    /// No policy leaves the process here, so keys with IAM wildcard
    /// characters are fine: the signature binds the literal key.
    pub async fn presigned_put(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential<PresignedUrl>, CredentialError> {
        let scope = ScopeDocument::for_object(&self.bucket, key)?;

        tracing::info!(%key, "presigning upload");
        let url = self.presigner.presign_put(key, PRESIGN_TTL).await?;

        Ok(IssuedCredential {
            key: key.to_string(),
            scope,
            issued_at: now,
            expires_at: now + ttl(PRESIGN_TTL)?,
            grant: PresignedUrl { url },
        })
    }
}

fn ttl(duration: Duration) -> Result<chrono::Duration, IssueError> {
    chrono::Duration::from_std(duration).map_err(|_| IssueError::InvalidDuration(duration))
}
