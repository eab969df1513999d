//! The request gate pipeline.
//!
//! # Data Flow
//! ```text
//! GateRequest
//!     → PathClassifier (API vs non-API)
//!         API     → CorsResponder → Preflight | PassThroughWithCors | Reject
//!         non-API → AuthGate (+ SessionVerifier) → PassThrough | Redirect
//!     → Decision (exactly one, final)
//! ```
//!
//! # Design Decisions
//! - Built once from `GateConfig`, shared read-only via `Arc`
//! - No request reaches both the CORS responder and the auth gate
//! - The identity provider is only consulted on the auth branch, and only for
//!   non-public paths
//! - No side effects before the decision is returned, so cancellation is safe
//! - Paths are canonicalized before classification, so `/api/../admin` or
//!   `/%61dmin` are judged as `/admin`

pub mod decision;

use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use thiserror::Error;

use crate::auth::{AuthGate, IdentityClientError, RemoteSessionVerifier, SessionToken, SessionVerifier};
use crate::config::GateConfig;
use crate::http::GateRequest;
use crate::observability::metrics;
use crate::routing::{canonical_path, PathClassifier, PatternError, RouteMatcher, Traffic};
use crate::security::cors::{CorsConfigError, CorsResponder};

pub use decision::{Decision, RedirectKind};

/// Errors raised while building a [`Gate`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("route pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("cors: {0}")]
    Cors(#[from] CorsConfigError),

    #[error("identity provider: {0}")]
    Identity(#[from] IdentityClientError),

    #[error("upstream address: {0}")]
    Upstream(#[from] axum::http::uri::InvalidUri),
}

/// Compiled gate. Immutable after construction.
pub struct Gate {
    classifier: PathClassifier,
    routes: RouteMatcher,
    cors: CorsResponder,
    auth: AuthGate,
    verifier: Arc<dyn SessionVerifier>,
}

impl Gate {
    /// Build a gate with a caller-supplied identity provider.
    pub fn new(config: &GateConfig, verifier: Arc<dyn SessionVerifier>) -> Result<Self, BuildError> {
        let routes = RouteMatcher::new(
            &config.routes.protected,
            &config.routes.excluded,
            config.routes.catch_all,
        )?;

        Ok(Self {
            classifier: PathClassifier::new(config.gate.api_prefix.clone()),
            routes,
            cors: CorsResponder::from_config(&config.cors)?,
            auth: AuthGate::from_config(&config.auth),
            verifier,
        })
    }

    /// Build a gate that verifies sessions against `identity.session_endpoint`.
    pub fn from_config(config: &GateConfig) -> Result<Self, BuildError> {
        let verifier = RemoteSessionVerifier::from_config(&config.identity)?;
        Self::new(config, Arc::new(verifier))
    }

    /// Whether the pipeline runs for this path at all.
    ///
    /// API paths always run (CORS); other paths only when the route matcher
    /// selects them. Everything else is forwarded untouched.
    pub fn triggers(&self, path: &str) -> bool {
        let path = canonical_path(path);
        self.classifier.classify(&path) == Traffic::Api || self.routes.matches(&path)
    }

    /// The exclusion pattern that keeps `path` out of the pipeline, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        self.routes
            .excluded_by(&canonical_path(path))
            .map(|p| p.as_str())
    }

    /// Evaluate one request.
    pub async fn evaluate(&self, req: &GateRequest<'_>) -> Decision {
        let start = Instant::now();

        let decision = match self.classifier.classify(req.path()) {
            Traffic::Api => self.cors.respond(req),
            Traffic::NonApi => self.authorize(req).await,
        };

        tracing::debug!(
            method = %req.method(),
            path = %req.path(),
            decision = decision.label(),
            "Gate decision"
        );
        metrics::record_decision(decision.label(), start);

        decision
    }

    async fn authorize(&self, req: &GateRequest<'_>) -> Decision {
        if self.auth.is_public(req.path()) {
            return self.auth.decide(req, None);
        }
        let token = self.resolve_session(req.headers()).await;
        self.auth.decide(req, token.as_ref())
    }

    /// Fail closed: every verification error becomes "no session".
    async fn resolve_session(&self, headers: &HeaderMap) -> Option<SessionToken> {
        match self.verifier.verify(headers).await {
            Ok(token) => token,
            Err(e) if e.is_fault() => {
                tracing::warn!(error = %e, "Identity provider unavailable, treating as unauthenticated");
                metrics::record_identity_unavailable();
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session not verified");
                None
            }
        }
    }
}
