//! Gate middleware.
//! Runs the request gate in front of every handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::gate::{Decision, Gate};
use crate::http::request::canonical_uri;
use crate::http::response;
use crate::http::GateRequest;

pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // The handler sees the same path the gate judged.
    match canonical_uri(request.uri()) {
        Ok(Some(uri)) => {
            tracing::debug!(
                from = %request.uri().path(),
                to = %uri.path(),
                "Rewrote request path to canonical form"
            );
            *request.uri_mut() = uri;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "Cannot canonicalize request path");
            return response::reject(StatusCode::BAD_REQUEST);
        }
    }

    // Excluded paths never reach the pipeline.
    if !gate.triggers(request.uri().path()) {
        tracing::debug!(
            path = %request.uri().path(),
            excluded_by = gate.excluded_by(request.uri().path()).unwrap_or("-"),
            "Bypassing gate"
        );
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let decision = gate.evaluate(&GateRequest::from(&parts)).await;
    let request = Request::from_parts(parts, body);

    match decision {
        Decision::PassThrough => next.run(request).await,
        Decision::PassThroughWithCors(headers) => {
            response::with_headers(next.run(request).await, headers)
        }
        Decision::Preflight(headers) => response::preflight(headers),
        Decision::Redirect { location, .. } => response::redirect(&location),
        Decision::Reject { status } => response::reject(status),
    }
}
