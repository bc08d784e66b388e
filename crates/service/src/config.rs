use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;

/// Keys that must be present, either in the config file or the environment.
const REQUIRED_KEYS: [&str; 4] = [
    "AWS_REGION",
    "AWS_S3_BUCKET_NAME",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
];

/// Process-wide server configuration.
///
/// Built once at startup from an optional JSON file overlaid with
/// environment variables, then shared read-only behind an `Arc`.
#[derive(Clone)]
pub struct ServerConfig {
    /// port the HTTP server listens on
    pub port: u16,

    // object store
    /// region the bucket lives in, eg "us-east-1"
    pub region: String,
    /// bare bucket name, no protocol prefix or path
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// S3-compatible endpoint override (MinIO and friends),
    ///  when set object urls are path-style
    pub endpoint: Option<Url>,

    // request gate
    /// single username/password pair required on every gated request,
    ///  only set when both halves are configured
    pub basic_auth: Option<BasicAuth>,
    /// instant after which uploads are refused
    pub deadline: Option<DateTime<Utc>>,
    /// directories a client may upload into, empty disables directories
    pub upload_dirs: Vec<String>,
    /// origins whose requests get CORS headers mirrored back
    pub allowed_origins: Vec<String>,

    // features
    pub enable_burner_credentials: bool,

    // ui
    /// free-form values made available to every rendered page
    pub template_data: Map<String, Value>,
}

/// The configured HTTP basic-auth pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("basic_auth", &self.basic_auth)
            .field("deadline", &self.deadline)
            .field("upload_dirs", &self.upload_dirs)
            .field("allowed_origins", &self.allowed_origins)
            .field("enable_burner_credentials", &self.enable_burner_credentials)
            .field("template_data", &self.template_data)
            .finish()
    }
}

/// On-disk shape of `config.json`. Keys match the environment variable names.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    port: Option<PortSetting>,
    #[serde(rename = "AWS_REGION", default)]
    region: Option<String>,
    #[serde(rename = "AWS_S3_BUCKET_NAME", default)]
    bucket: Option<String>,
    #[serde(rename = "AWS_ACCESS_KEY_ID", default)]
    access_key_id: Option<String>,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY", default)]
    secret_access_key: Option<String>,
    #[serde(rename = "AWS_ENDPOINT_URL", default)]
    endpoint: Option<String>,
    #[serde(rename = "HTTP_AUTH_USERNAME", default)]
    auth_username: Option<String>,
    #[serde(rename = "HTTP_AUTH_PASSWORD", default)]
    auth_password: Option<String>,
    #[serde(rename = "DEADLINE", default)]
    deadline: Option<String>,
    #[serde(rename = "UPLOAD_DIRS", default)]
    upload_dirs: Vec<String>,
    #[serde(rename = "ALLOWED_ORIGINS", default)]
    allowed_origins: Vec<String>,
    #[serde(default)]
    enable_burner_credentials: bool,
    #[serde(default)]
    template_data: Map<String, Value>,
}

// older config files carry the port as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortSetting {
    Number(u16),
    Text(String),
}

impl ServerConfig {
    /// Minimal configuration with every optional feature turned off.
    pub fn new(
        region: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            port: DEFAULT_PORT,
            region: region.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            endpoint: None,
            basic_auth: None,
            deadline: None,
            upload_dirs: Vec::new(),
            allowed_origins: Vec::new(),
            enable_burner_credentials: false,
            template_data: Map::new(),
        }
    }

    /// Load configuration from `path` (if it exists), then overlay every
    /// non-empty value returned by `env`.
    pub fn load<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = if path.exists() {
            let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<ConfigFile>(&data).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no config file found, using environment only");
            ConfigFile::default()
        };

        Self::from_sources(file, env)
    }

    fn from_sources<F>(file: ConfigFile, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.is_empty());
        let string = |key: &str, fallback: Option<String>| {
            env(key).or(fallback).filter(|value| !value.is_empty())
        };
        let list = |key: &str, fallback: Vec<String>| match env(key) {
            Some(raw) => split_list(&raw),
            None => fallback
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        };

        let port = match env("PORT") {
            Some(raw) => parse_port(&raw)?,
            None => match file.port {
                Some(PortSetting::Number(port)) => port,
                Some(PortSetting::Text(raw)) if !raw.is_empty() => parse_port(&raw)?,
                _ => DEFAULT_PORT,
            },
        };

        let region = string("AWS_REGION", file.region);
        let bucket = string("AWS_S3_BUCKET_NAME", file.bucket);
        let access_key_id = string("AWS_ACCESS_KEY_ID", file.access_key_id);
        let secret_access_key = string("AWS_SECRET_ACCESS_KEY", file.secret_access_key);

        for (key, value) in REQUIRED_KEYS
            .iter()
            .zip([&region, &bucket, &access_key_id, &secret_access_key])
        {
            if value.is_none() {
                return Err(ConfigError::Missing(*key));
            }
        }

        let endpoint = string("AWS_ENDPOINT_URL", file.endpoint)
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    key: "AWS_ENDPOINT_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let basic_auth = match (
            string("HTTP_AUTH_USERNAME", file.auth_username),
            string("HTTP_AUTH_PASSWORD", file.auth_password),
        ) {
            (Some(username), Some(password)) => Some(BasicAuth { username, password }),
            _ => None,
        };

        let deadline = string("DEADLINE", file.deadline)
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|deadline| deadline.with_timezone(&Utc))
                    .map_err(|e| ConfigError::InvalidValue {
                        key: "DEADLINE",
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let enable_burner_credentials = match env("ENABLE_BURNER_CREDENTIALS") {
            Some(raw) => parse_flag(&raw),
            None => file.enable_burner_credentials,
        };

        let mut upload_dirs = Vec::new();
        for dir in list("UPLOAD_DIRS", file.upload_dirs) {
            if !upload_dirs.contains(&dir) {
                upload_dirs.push(dir);
            }
        }

        Ok(Self {
            port,
            region: region.unwrap_or_default(),
            bucket: bucket.unwrap_or_default(),
            access_key_id: access_key_id.unwrap_or_default(),
            secret_access_key: secret_access_key.unwrap_or_default(),
            endpoint,
            basic_auth,
            deadline,
            upload_dirs,
            allowed_origins: list("ALLOWED_ORIGINS", file.allowed_origins),
            enable_burner_credentials,
            template_data: file.template_data,
        })
    }

    /// Public URL an object can be fetched from once uploaded (if its ACL allows).
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.as_str().trim_end_matches('/'),
                self.bucket,
                key
            ),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }

    /// Outputs any notable settings.
    pub fn log_summary(&self) {
        tracing::info!(
            port = self.port,
            region = %self.region,
            bucket = %self.bucket,
            "upload server config"
        );
        if let Some(endpoint) = &self.endpoint {
            tracing::info!(%endpoint, "using custom object store endpoint");
        }
        if self.basic_auth.is_some() {
            tracing::info!("http authorization enabled");
        }
        if let Some(deadline) = self.deadline {
            tracing::info!(%deadline, "deadline for uploading set");
        }
        if self.enable_burner_credentials {
            tracing::info!("burner credentials enabled");
        }
        if !self.upload_dirs.is_empty() {
            tracing::info!(dirs = ?self.upload_dirs, "limiting uploading to the following paths");
        }
        if !self.allowed_origins.is_empty() {
            tracing::info!(origins = ?self.allowed_origins, "accepting requests from the following origins");
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            key: "PORT",
            reason: e.to_string(),
        })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} env variable or config key must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
