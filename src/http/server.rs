//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: gate middleware in front of the application
//! - Wire up middleware (tracing, timeout, concurrency limit, request ID)
//! - Forward admitted requests to the application upstream
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{GateConfig, UpstreamConfig};
use crate::gate::{BuildError, Gate};
use crate::http::middleware::gate_middleware;
use crate::http::request::MakeRequestUuid;
use crate::observability::metrics;
use crate::security::headers::{add_forwarded, strip_hop_by_hop};

/// Where admitted requests are forwarded.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl Upstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, BuildError> {
        let authority = Authority::from_str(&config.address)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, authority })
    }
}

/// HTTP server for the request gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Gate in front of a proxied upstream application, verifying sessions
    /// against the configured identity provider.
    pub fn new(config: GateConfig) -> Result<Self, BuildError> {
        let gate = Arc::new(Gate::from_config(&config)?);
        let upstream = Upstream::from_config(&config.upstream)?;
        Ok(Self::with_app(config, gate, proxy_router(upstream)))
    }

    /// Gate in front of an in-process application router.
    pub fn with_app(config: GateConfig, gate: Arc<Gate>, app: Router) -> Self {
        let router = Self::build_router(&config, gate, app);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, gate: Arc<Gate>, app: Router) -> Router {
        // The application is nested as a fallback so it routes on the
        // canonical URI the gate middleware leaves behind.
        Router::new()
            .fallback_service(app)
            .layer(from_fn_with_state(gate, gate_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for driving it without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_connections = self.config.listener.max_connections,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Router forwarding every path to `upstream`.
pub fn proxy_router(upstream: Upstream) -> Router {
    Router::new()
        .route("/{*path}", any(proxy_handler))
        .route("/", any(proxy_handler))
        .with_state(upstream)
}

/// Forward the request to the upstream application unchanged, apart from
/// hop-by-hop and `X-Forwarded-*` headers.
async fn proxy_handler(State(upstream): State<Upstream>, request: Request<Body>) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    strip_hop_by_hop(&mut parts.headers);
    add_forwarded(&mut parts.headers, client_ip);

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream.authority, error = %e, "Upstream error");
            metrics::record_upstream_error();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
