use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sts::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;

use super::{FederationTokens, IssueError, TemporaryKeys};
use crate::config::ServerConfig;

/// GetFederationToken against STS with the server's static credentials.
#[derive(Debug, Clone)]
pub struct StsFederation {
    client: Client,
}

impl StsFederation {
    pub fn from_config(config: &ServerConfig) -> Self {
        let creds = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "bucketgate-config",
        );

        let mut builder = aws_sdk_sts::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(creds);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.as_str().trim_end_matches('/'));
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl FederationTokens for StsFederation {
    async fn federation_token(
        &self,
        name: &str,
        policy: &str,
        duration: Duration,
    ) -> Result<TemporaryKeys, IssueError> {
        let seconds =
            i32::try_from(duration.as_secs()).map_err(|_| IssueError::InvalidDuration(duration))?;

        let output = self
            .client
            .get_federation_token()
            .name(name)
            .policy(policy)
            .duration_seconds(seconds)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(e).to_string();
                tracing::error!(%name, error = %message, "federation token request failed");
                IssueError::Federation(message)
            })?;

        let creds = output.credentials().ok_or(IssueError::MissingCredentials)?;

        Ok(TemporaryKeys {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
        })
    }
}
