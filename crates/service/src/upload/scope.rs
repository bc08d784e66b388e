//! IAM-style permission documents scoped to a single object.

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";

/// Everything a holder of the document may do to its one object: write it,
/// make it public, and remove it again.
pub const OBJECT_ACTIONS: [&str; 3] = ["s3:PutObject", "s3:PutObjectAcl", "s3:DeleteObject"];

const S3_ARN_PREFIX: &str = "arn:aws:s3:::";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("bucket name is required to scope credentials")]
    EmptyBucket,
    #[error("object key is required to scope credentials")]
    EmptyKey,
    #[error("resource '{0}' contains policy wildcard or variable characters")]
    WildcardKey(String),
    #[error("error encoding scope document: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

/// A permission document allowing [`OBJECT_ACTIONS`] on exactly one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScopeDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl ScopeDocument {
    /// Build the document for `bucket/key`. Any non-empty key is accepted;
    /// see [`ScopeDocument::to_policy`] for the stricter form.
    pub fn for_object(bucket: &str, key: &str) -> Result<Self, ScopeError> {
        if bucket.is_empty() {
            return Err(ScopeError::EmptyBucket);
        }
        if key.is_empty() {
            return Err(ScopeError::EmptyKey);
        }

        Ok(Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                effect: Effect::Allow,
                action: OBJECT_ACTIONS.iter().map(|a| a.to_string()).collect(),
                resource: vec![format!("{}{}/{}", S3_ARN_PREFIX, bucket, key)],
            }],
        })
    }

    /// Every resource named by any statement.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.statement
            .iter()
            .flat_map(|s| s.resource.iter().map(String::as_str))
    }

    pub fn to_json(&self) -> Result<String, ScopeError> {
        serde_json::to_string(self).map_err(|e| ScopeError::Encode(e.to_string()))
    }

    /// Encode the document for use as an IAM policy.
    ///
    /// Resources containing `*`, `?` or `${` are refused: IAM reads them as
    /// wildcards or variables, which would widen the grant past the one
    /// object.
    pub fn to_policy(&self) -> Result<String, ScopeError> {
        if let Some(resource) = self
            .resources()
            .find(|r| r.contains(['*', '?']) || r.contains("${"))
        {
            return Err(ScopeError::WildcardKey(resource.to_string()));
        }
        self.to_json()
    }
}
