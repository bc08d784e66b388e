use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use serde_json::{Map, Value};

use crate::config::ServerConfig;

const DEFAULT_TITLE: &str = "Upload";

/// Values shared by every page: the free-form `template_data` from the
/// config plus the directory whitelist.
#[derive(Debug, Clone)]
pub struct PageContext {
    data: Map<String, Value>,
    pub upload_dirs: Vec<String>,
}

impl PageContext {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            data: config.template_data.clone(),
            upload_dirs: config.upload_dirs.clone(),
        }
    }

    /// A `template_data` entry as display text, empty when unset.
    pub fn get(&self, key: &str) -> String {
        match self.data.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn title(&self) -> String {
        let title = self.get("title");
        if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "access_denied.html")]
pub struct AccessDeniedTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "expired.html")]
pub struct ExpiredTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "burner.html")]
pub struct BurnerTemplate {
    pub page: PageContext,
    pub bucket: String,
    pub region: String,
    pub path: String,
    pub filename: String,
    pub expiry: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

/// Render `template` with `status`. A failed render becomes a 500 carrying
/// the raw error text.
pub fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("template render error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
