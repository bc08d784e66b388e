use std::sync::Arc;

use super::config::ServerConfig;
use super::http::gate::RequestGate;
use super::upload::CredentialIssuer;
use super::upstream::{FederationTokens, ObjectListing, RequestPresigner, S3Bucket, StsFederation};

/// Main service state - shared read-only by every request handler
#[derive(Clone)]
pub struct State {
    config: Arc<ServerConfig>,
    gate: Arc<RequestGate>,
    listing: Arc<dyn ObjectListing>,
    issuer: CredentialIssuer,
}

impl State {
    /// Build the state with AWS-backed upstreams. No network calls are made here.
    pub fn from_config(config: ServerConfig) -> Self {
        let bucket = Arc::new(S3Bucket::from_config(&config));
        let federation = Arc::new(StsFederation::from_config(&config));
        tracing::debug!(region = %config.region, bucket = %config.bucket, "object store clients configured");
        Self::with_upstreams(config, bucket.clone(), bucket, federation)
    }

    /// Build the state around arbitrary upstream implementations.
    pub fn with_upstreams(
        config: ServerConfig,
        listing: Arc<dyn ObjectListing>,
        presigner: Arc<dyn RequestPresigner>,
        federation: Arc<dyn FederationTokens>,
    ) -> Self {
        let gate = Arc::new(RequestGate::from_config(&config));
        let issuer = CredentialIssuer::new(config.bucket.clone(), presigner, federation);
        Self {
            config: Arc::new(config),
            gate,
            listing,
            issuer,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    pub fn listing(&self) -> &dyn ObjectListing {
        self.listing.as_ref()
    }

    pub fn issuer(&self) -> &CredentialIssuer {
        &self.issuer
    }
}
