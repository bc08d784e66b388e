use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use super::{IssueError, ObjectListing, RequestPresigner, StoreError};
use crate::config::ServerConfig;

/// The configured bucket, reached with the server's static credentials.
#[derive(Debug, Clone)]
pub struct S3Bucket {
    client: Client,
    bucket: String,
}

impl S3Bucket {
    pub fn from_config(config: &ServerConfig) -> Self {
        let creds = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "bucketgate-config",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(creds);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .endpoint_url(endpoint.as_str().trim_end_matches('/'))
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectListing for S3Bucket {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation_token = None;
        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|e| {
                let message = DisplayErrorContext(e).to_string();
                tracing::error!(bucket = %self.bucket, %prefix, error = %message, "list objects failed");
                StoreError::List(message)
            })?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(ToOwned::to_owned);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        tracing::debug!(%prefix, count = keys.len(), "listed existing objects");
        Ok(keys)
    }
}

#[async_trait]
impl RequestPresigner for S3Bucket {
    async fn presign_put(&self, key: &str, expires_in: Duration) -> Result<String, IssueError> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| IssueError::Presign(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .presigned(presigning)
            .await
            .map_err(|e| IssueError::Presign(DisplayErrorContext(e).to_string()))?;

        Ok(request.uri().to_string())
    }
}
