//! Identity provider seam.
//!
//! # Responsibilities
//! - Define the async [`SessionVerifier`] contract the gate calls
//! - Provide [`RemoteSessionVerifier`], which asks the provider's session
//!   endpoint about the caller's session cookie
//!
//! # Design Decisions
//! - The verifier owns its timeout; the gate never retries
//! - No session cookie means no network call
//! - Every failure is reported as a [`VerifyError`]; the gate turns all of them
//!   into "no token"

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::auth::token::SessionToken;
use crate::config::IdentityConfig;

/// Why a session could not be verified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("identity provider timed out")]
    Timeout,

    #[error("malformed session: {0}")]
    Malformed(String),

    #[error("session rejected by identity provider")]
    Rejected,
}

impl VerifyError {
    /// Infrastructure faults, as opposed to a caller presenting a bad session.
    pub fn is_fault(&self) -> bool {
        matches!(self, VerifyError::Unavailable(_) | VerifyError::Timeout)
    }
}

/// Resolves the caller's session from request headers.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` when the caller has no session.
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<SessionToken>, VerifyError>;
}

/// Errors raised while building a [`RemoteSessionVerifier`].
#[derive(Debug, Error)]
pub enum IdentityClientError {
    #[error("invalid session endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Verifies sessions against the provider's session endpoint.
#[derive(Debug, Clone)]
pub struct RemoteSessionVerifier {
    client: reqwest::Client,
    endpoint: Url,
    session_cookies: Vec<String>,
}

impl RemoteSessionVerifier {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(&config.session_endpoint)?,
            session_cookies: config.session_cookies.clone(),
        })
    }
}

#[async_trait]
impl SessionVerifier for RemoteSessionVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<SessionToken>, VerifyError> {
        if !has_session_cookie(headers, &self.session_cookies) {
            return Ok(None);
        }

        let mut request = self
            .client
            .get(self.endpoint.clone())
            .header(header::ACCEPT, "application/json");
        for cookie in headers.get_all(header::COOKIE) {
            request = request.header(header::COOKIE, cookie.clone());
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(VerifyError::Rejected);
        }
        if !status.is_success() {
            return Err(VerifyError::Unavailable(format!("session endpoint returned {status}")));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let envelope: Option<SessionEnvelope> =
            serde_json::from_slice(&body).map_err(|e| VerifyError::Malformed(e.to_string()))?;

        Ok(envelope.and_then(SessionEnvelope::into_token))
    }
}

fn transport_error(e: reqwest::Error) -> VerifyError {
    if e.is_timeout() {
        VerifyError::Timeout
    } else {
        VerifyError::Unavailable(e.to_string())
    }
}

/// Session endpoint payload. An empty object means "no session".
#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: Option<SessionUser>,
    role: Option<String>,
    expires: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    id: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

impl SessionEnvelope {
    fn into_token(self) -> Option<SessionToken> {
        if self.user.is_none() && self.role.is_none() {
            return None;
        }
        let (subject, user_role) = match self.user {
            Some(user) => (user.id.or(user.email), user.role),
            None => (None, None),
        };
        Some(SessionToken {
            subject,
            role: self.role.or(user_role),
            expires: self.expires,
        })
    }
}

/// True if any `Cookie` header carries one of `names`.
///
/// Large session cookies may be split into `name.0`, `name.1`, ...; a chunk
/// counts as the cookie being present.
pub fn has_session_cookie(headers: &HeaderMap, names: &[String]) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, _)| name.trim())
        .any(|name| {
            names.iter().any(|wanted| {
                name == wanted.as_str()
                    || name
                        .strip_prefix(wanted.as_str())
                        .and_then(|rest| rest.strip_prefix('.'))
                        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            })
        })
}
