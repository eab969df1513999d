//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Provide a typed, read-only view of a request for the gate
//! - Rewrite request URIs to their canonical path before the gate runs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The gate borrows method, URI and headers; it never owns or mutates the request
//! - The view always exposes the canonical path, whatever spelling was sent

use std::borrow::Cow;

use axum::http::{
    header, request::Parts, uri::PathAndQuery, HeaderMap, HeaderValue, Method, Request, Uri,
};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::routing::canonical_path;

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// `uri` with its path replaced by the canonical spelling, query kept.
///
/// `None` when the path is already canonical.
pub fn canonical_uri(uri: &Uri) -> Result<Option<Uri>, axum::http::Error> {
    let path = canonical_path(uri.path());
    if path == uri.path() {
        return Ok(None);
    }

    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.into_owned(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Some(Uri::from_parts(parts)?))
}

/// Borrowed view of an inbound request, as seen by the gate.
#[derive(Debug, Clone)]
pub struct GateRequest<'a> {
    method: &'a Method,
    uri: &'a Uri,
    path: Cow<'a, str>,
    headers: &'a HeaderMap,
}

impl<'a> GateRequest<'a> {
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            uri,
            path: canonical_path(uri.path()),
            headers,
        }
    }

    pub fn method(&self) -> &Method {
        self.method
    }

    /// Canonical path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Canonical path plus the caller's query string.
    pub fn path_and_query(&self) -> Cow<'_, str> {
        match self.query() {
            Some(query) => Cow::Owned(format!("{}?{query}", self.path)),
            None => Cow::Borrowed(self.path.as_ref()),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        self.headers
    }

    /// The caller's `Origin` header.
    pub fn origin(&self) -> Option<&HeaderValue> {
        self.headers.get(header::ORIGIN)
    }

    pub fn is_preflight(&self) -> bool {
        *self.method == Method::OPTIONS
    }
}

impl<'a, B> From<&'a Request<B>> for GateRequest<'a> {
    fn from(req: &'a Request<B>) -> Self {
        Self::new(req.method(), req.uri(), req.headers())
    }
}

impl<'a> From<&'a Parts> for GateRequest<'a> {
    fn from(parts: &'a Parts) -> Self {
        Self::new(&parts.method, &parts.uri, &parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_view_over_request() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("http://example.com/api/words?limit=5")
            .header("ORIGIN", "https://x.com")
            .body(Body::empty())
            .unwrap();
        let view = GateRequest::from(&req);

        assert_eq!(view.path(), "/api/words");
        assert_eq!(view.query(), Some("limit=5"));
        assert_eq!(view.path_and_query(), "/api/words?limit=5");
        assert_eq!(view.origin().unwrap(), "https://x.com");
        assert!(view.is_preflight());
    }

    #[test]
    fn test_view_exposes_canonical_path() {
        let req = Request::builder()
            .uri("/api/%2e%2e//%61dmin/users?tab=1")
            .body(())
            .unwrap();
        let view = GateRequest::from(&req);

        assert_eq!(view.path(), "/admin/users");
        assert_eq!(view.path_and_query(), "/admin/users?tab=1");
    }

    #[test]
    fn test_canonical_uri() {
        let uri: Uri = "http://example.com//home/./a/../dashboard?x=%2e".parse().unwrap();
        let canonical = canonical_uri(&uri).unwrap().unwrap();
        assert_eq!(canonical.path(), "/home/dashboard");
        assert_eq!(canonical.query(), Some("x=%2e"));
        assert_eq!(canonical.authority().unwrap(), "example.com");

        let clean: Uri = "/home/dashboard?x=1".parse().unwrap();
        assert!(canonical_uri(&clean).unwrap().is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let req = Request::new(Body::empty());
        let mut maker = MakeRequestUuid;
        let a = maker.make_request_id(&req).unwrap();
        let b = maker.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
