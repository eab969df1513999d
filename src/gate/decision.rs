//! Pipeline output.

use axum::http::{HeaderMap, StatusCode};

/// Why a redirect was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// No usable session; sent to the identity provider's sign-in page.
    Login,
    /// Session present but the role does not allow the path.
    Unauthorized,
}

/// The single, final outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Answer a CORS preflight directly; never forwarded.
    Preflight(HeaderMap),
    /// Forward, then attach these CORS headers to the response.
    PassThroughWithCors(HeaderMap),
    /// Forward unmodified.
    PassThrough,
    Redirect { location: String, kind: RedirectKind },
    Reject { status: StatusCode },
}

impl Decision {
    /// Stable label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Preflight(_) => "preflight",
            Decision::PassThroughWithCors(_) => "pass_through_cors",
            Decision::PassThrough => "pass_through",
            Decision::Redirect {
                kind: RedirectKind::Login,
                ..
            } => "redirect_login",
            Decision::Redirect {
                kind: RedirectKind::Unauthorized,
                ..
            } => "redirect_unauthorized",
            Decision::Reject { .. } => "reject",
        }
    }

    /// True if the request reaches the downstream handler.
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Decision::PassThrough | Decision::PassThroughWithCors(_))
    }
}
