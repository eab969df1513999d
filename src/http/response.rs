//! Response rendering for gate decisions.
//!
//! # Responsibilities
//! - Turn short-circuit decisions (preflight, redirect, reject) into responses
//! - Attach CORS headers to forwarded responses
//!
//! # Design Decisions
//! - Redirects use 307 so the method and body survive the round trip
//! - Preflight and reject responses have an empty body

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// `200 OK`, empty body, CORS headers.
pub fn preflight(headers: HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    *response.headers_mut() = headers;
    response
}

/// `307 Temporary Redirect` to `location`.
///
/// Locations come from validated config and form-encoded paths; if one still
/// is not a valid header value the request is refused rather than forwarded.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location = %location, "Redirect target is not a valid header value");
            reject(StatusCode::FORBIDDEN)
        }
    }
}

pub fn reject(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

/// Overwrite `headers` on a forwarded response.
pub fn with_headers(mut response: Response, headers: HeaderMap) -> Response {
    for (name, value) in headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
