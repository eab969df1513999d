//! Session based authorization for non-API traffic.
//!
//! ```text
//! START ─ public path? ── yes ──────────────────────────────▶ FORWARD
//!           │ no
//!           ▼
//!         token? ─── no ─────────────────────────────────────▶ REDIRECT_LOGIN
//!           │ yes
//!           ▼
//!         admin path and role != admin_role? ── yes ─────────▶ REDIRECT_UNAUTHORIZED
//!           │ no
//!           ▼
//!         FORWARD
//! ```
//!
//! The state machine is pure: token resolution happens before [`AuthGate::decide`]
//! and a missing, malformed or unverifiable token all arrive here as `None`.

use url::form_urlencoded;

use crate::auth::token::SessionToken;
use crate::config::AuthConfig;
use crate::gate::{Decision, RedirectKind};
use crate::http::GateRequest;

#[derive(Debug, Clone)]
pub struct AuthGate {
    public_routes: Vec<String>,
    admin_prefix: String,
    admin_role: String,
    sign_in_path: String,
    callback_param: String,
    unauthorized_path: String,
}

impl AuthGate {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            public_routes: config.public_routes.clone(),
            admin_prefix: config.admin_prefix.clone(),
            admin_role: config.admin_role.clone(),
            sign_in_path: config.sign_in_path.clone(),
            callback_param: config.callback_param.clone(),
            unauthorized_path: config.unauthorized_path.clone(),
        }
    }

    /// Public paths never need a session. The sign-in page is always public.
    pub fn is_public(&self, path: &str) -> bool {
        path == self.sign_in_path || self.public_routes.iter().any(|r| r == path)
    }

    /// Admin paths are a raw prefix match, so `/administrator` counts too.
    pub fn is_admin_path(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix)
    }

    /// Run the state machine for a non-API request.
    pub fn decide(&self, req: &GateRequest<'_>, token: Option<&SessionToken>) -> Decision {
        let path = req.path();
        if self.is_public(path) {
            return Decision::PassThrough;
        }

        let Some(token) = token else {
            return Decision::Redirect {
                location: self.login_location(req),
                kind: RedirectKind::Login,
            };
        };

        if self.is_admin_path(path) && !token.has_role(&self.admin_role) {
            return Decision::Redirect {
                location: self.unauthorized_path.clone(),
                kind: RedirectKind::Unauthorized,
            };
        }

        Decision::PassThrough
    }

    /// Sign-in URL carrying the original path and query for the return trip.
    fn login_location(&self, req: &GateRequest<'_>) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.callback_param, &req.path_and_query())
            .finish();
        format!("{}?{}", self.sign_in_path, query)
    }
}
