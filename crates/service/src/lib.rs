//! Browser upload gateway for S3.
//!
//! Hands out credentials that can write exactly one object key for a bounded
//! time, behind optional basic auth and an optional hard deadline:
//! - `config`: JSON file plus environment overrides
//! - `upload`: path policy, collision avoidance, scope documents, issuance
//! - `upstream`: the S3 and STS seams
//! - `http`: routes, the request gate, CORS and rendered pages

pub mod config;
pub mod http;
pub mod state;
pub mod upload;
pub mod upstream;

pub use config::{ConfigError, ServerConfig};
pub use state::State as ServiceState;
