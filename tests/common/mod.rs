//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use edge_gate::auth::{SessionToken, SessionVerifier, VerifyError};
use serde_json::json;
use tokio::net::TcpListener;

pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Cookie header value carrying `token` as the session.
pub fn session_cookie(token: &str) -> String {
    format!("theme=dark; {SESSION_COOKIE}={token}")
}

fn session_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// In-process identity provider: the session cookie value is the role.
///
/// `invalid` yields a malformed session, `down` an outage.
#[derive(Default)]
pub struct CookieRoleVerifier {
    calls: AtomicUsize,
}

impl CookieRoleVerifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionVerifier for CookieRoleVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<SessionToken>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match session_value(headers).as_deref() {
            None => Ok(None),
            Some("invalid") => Err(VerifyError::Malformed("bad signature".into())),
            Some("down") => Err(VerifyError::Unavailable("connection refused".into())),
            Some("none") => Ok(Some(SessionToken::default())),
            Some(role) => Ok(Some(SessionToken::with_role(role))),
        }
    }
}

/// Application stand-in: every route answers `200 <path>`.
pub fn app() -> Router {
    async fn echo(uri: axum::http::Uri) -> impl IntoResponse {
        uri.path().to_string()
    }

    Router::new()
        .route("/", get(echo))
        .route("/login", get(echo))
        .route("/register", get(echo))
        .route("/favicon.ico", get(echo))
        .route("/_next/static/{*file}", get(echo))
        .route("/api/words", get(echo).post(echo))
        .route("/api/admin/stats", get(echo))
        .route("/home/{*rest}", get(echo))
        .route("/admin/{*rest}", get(echo))
        .route("/wordlist", get(echo))
        .route("/settings", get(echo))
        .route("/unauthorized", get(echo))
}

/// Bind a router on an ephemeral loopback port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Upstream application reporting what it received.
pub async fn start_mock_upstream() -> SocketAddr {
    async fn report(headers: HeaderMap, uri: axum::http::Uri) -> impl IntoResponse {
        let forwarded_for = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({
            "path": uri.path(),
            "query": uri.query(),
            "forwarded_for": forwarded_for,
        }))
    }

    serve(Router::new().route("/{*path}", any(report)).route("/", any(report))).await
}

/// Identity provider session endpoint behaving like a next-auth deployment.
///
/// The cookie value selects the answer: a role name, `slow` (sleeps past any
/// sane timeout), `broken` (500) or `garbage` (not JSON).
pub async fn start_mock_identity_provider() -> SocketAddr {
    async fn session(headers: HeaderMap) -> axum::response::Response {
        match session_value(&headers).as_deref() {
            None => Json(json!({})).into_response(),
            Some("slow") => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({})).into_response()
            }
            Some("broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Some("garbage") => "<html>".into_response(),
            Some(role) => Json(json!({
                "user": { "email": "someone@example.com", "role": role },
                "expires": "2030-01-01T00:00:00.000Z",
            }))
            .into_response(),
        }
    }

    serve(Router::new().route("/api/auth/session", get(session))).await
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
