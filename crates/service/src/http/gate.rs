//! Per-request gate: an ordered list of filters run before any gated handler.
//!
//! Each filter either lets the request continue or rejects it with a
//! terminal response. Authentication runs before the deadline check, so an
//! unauthenticated caller sees 401 even once the deadline has passed.

use std::fmt;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::{DateTime, Utc};
use http::header::{ORIGIN, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderValue, StatusCode};
use subtle::ConstantTimeEq;

use super::cors;
use super::render::{render, AccessDeniedTemplate, ExpiredTemplate, PageContext};
use crate::config::{BasicAuth, ServerConfig};
use crate::ServiceState;

const AUTH_CHALLENGE: &str = r#"Basic realm="Please enter your username and password for this site""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Reject(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 401, access-denied page plus a basic-auth challenge
    Unauthorized,
    /// 403, expired page
    Expired,
}

pub trait RequestFilter: fmt::Debug + Send + Sync {
    fn check(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Verdict;
}

/// Requires the configured basic-auth pair.
#[derive(Debug)]
pub struct BasicAuthFilter {
    expected: BasicAuth,
}

impl BasicAuthFilter {
    pub fn new(expected: BasicAuth) -> Self {
        Self { expected }
    }
}

impl RequestFilter for BasicAuthFilter {
    fn check(&self, headers: &HeaderMap, _now: DateTime<Utc>) -> Verdict {
        let Some(auth) = headers.typed_get::<Authorization<Basic>>() else {
            return Verdict::Reject(Rejection::Unauthorized);
        };

        if credentials_match(&self.expected, auth.username(), auth.password()) {
            Verdict::Continue
        } else {
            Verdict::Reject(Rejection::Unauthorized)
        }
    }
}

/// Compare both halves in constant time. Both comparisons always run.
pub fn credentials_match(expected: &BasicAuth, username: &str, password: &str) -> bool {
    let username_ok = username
        .as_bytes()
        .ct_eq(expected.username.as_bytes());
    let password_ok = password
        .as_bytes()
        .ct_eq(expected.password.as_bytes());
    (username_ok & password_ok).into()
}

/// Refuses everything once the deadline has passed.
#[derive(Debug)]
pub struct DeadlineFilter {
    deadline: DateTime<Utc>,
}

impl DeadlineFilter {
    pub fn new(deadline: DateTime<Utc>) -> Self {
        Self { deadline }
    }
}

impl RequestFilter for DeadlineFilter {
    fn check(&self, _headers: &HeaderMap, now: DateTime<Utc>) -> Verdict {
        if now > self.deadline {
            Verdict::Reject(Rejection::Expired)
        } else {
            Verdict::Continue
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestGate {
    filters: Vec<Box<dyn RequestFilter>>,
}

impl RequestGate {
    /// Install only the filters the configuration asks for, authentication first.
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut gate = Self::default();
        if let Some(auth) = &config.basic_auth {
            gate = gate.with_filter(BasicAuthFilter::new(auth.clone()));
        }
        if let Some(deadline) = config.deadline {
            gate = gate.with_filter(DeadlineFilter::new(deadline));
        }
        gate
    }

    pub fn with_filter(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run the filters in order, stopping at the first rejection.
    pub fn check(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Verdict {
        for filter in &self.filters {
            if let Verdict::Reject(rejection) = filter.check(headers, now) {
                return Verdict::Reject(rejection);
            }
        }
        Verdict::Continue
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Axum middleware wrapping every gated route.
pub async fn middleware(State(state): State<ServiceState>, request: Request, next: Next) -> Response {
    if let Verdict::Reject(rejection) = state.gate().check(request.headers(), Utc::now()) {
        tracing::info!(
            method = %request.method(),
            path = %request.uri().path(),
            ?rejection,
            "request rejected"
        );
        return rejection_response(rejection, state.config());
    }

    let origin = request.headers().get(ORIGIN).cloned();
    let mut response = next.run(request).await;
    cors::apply_cors_headers(
        &state.config().allowed_origins,
        origin.as_ref(),
        response.headers_mut(),
    );
    response
}

fn rejection_response(rejection: Rejection, config: &ServerConfig) -> Response {
    let page = PageContext::from_config(config);
    match rejection {
        Rejection::Unauthorized => {
            let mut response = render(StatusCode::UNAUTHORIZED, &AccessDeniedTemplate { page });
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_CHALLENGE));
            response
        }
        Rejection::Expired => render(StatusCode::FORBIDDEN, &ExpiredTemplate { page }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use http::header::AUTHORIZATION;

    use super::*;

    fn pair() -> BasicAuth {
        BasicAuth {
            username: "admin".into(),
            password: "hunter2".into(),
        }
    }

    fn basic_header(user: &str, pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.typed_insert(Authorization::basic(user, pass));
        headers
    }

    #[test]
    fn test_credentials_match_exact_pair_only() {
        let expected = pair();
        assert!(credentials_match(&expected, "admin", "hunter2"));

        for (user, pass) in [
            ("admin", "hunter3"),
            ("admim", "hunter2"),
            ("Admin", "hunter2"),
            ("admin", "hunter2 "),
            ("admin", "hunter"),
            ("admin2", "hunter2"),
            ("", ""),
            ("hunter2", "admin"),
        ] {
            assert!(!credentials_match(&expected, user, pass), "{}:{}", user, pass);
        }
    }

    #[test]
    fn test_basic_auth_filter() {
        let filter = BasicAuthFilter::new(pair());
        let now = Utc::now();

        assert_eq!(
            filter.check(&basic_header("admin", "hunter2"), now),
            Verdict::Continue
        );
        assert_eq!(
            filter.check(&basic_header("admin", "wrong"), now),
            Verdict::Reject(Rejection::Unauthorized)
        );
        assert_eq!(
            filter.check(&HeaderMap::new(), now),
            Verdict::Reject(Rejection::Unauthorized)
        );

        let mut bearer = HeaderMap::new();
        bearer.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(
            filter.check(&bearer, now),
            Verdict::Reject(Rejection::Unauthorized)
        );
    }

    #[test]
    fn test_deadline_filter() {
        let deadline = Utc::now();
        let filter = DeadlineFilter::new(deadline);
        assert_eq!(
            filter.check(&HeaderMap::new(), deadline - Duration::seconds(1)),
            Verdict::Continue
        );
        assert_eq!(filter.check(&HeaderMap::new(), deadline), Verdict::Continue);
        assert_eq!(
            filter.check(&HeaderMap::new(), deadline + Duration::seconds(1)),
            Verdict::Reject(Rejection::Expired)
        );
    }

    #[test]
    fn test_gate_from_config() {
        let mut config = ServerConfig::new("us-east-1", "b", "k", "s");
        assert!(RequestGate::from_config(&config).is_empty());

        config.basic_auth = Some(pair());
        config.deadline = Some(Utc::now() - Duration::hours(1));
        let gate = RequestGate::from_config(&config);
        let now = Utc::now();

        // authentication is checked before the deadline
        assert_eq!(
            gate.check(&HeaderMap::new(), now),
            Verdict::Reject(Rejection::Unauthorized)
        );
        assert_eq!(
            gate.check(&basic_header("admin", "hunter2"), now),
            Verdict::Reject(Rejection::Expired)
        );
    }
}
