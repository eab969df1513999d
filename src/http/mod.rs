//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, canonical URI, typed GateRequest view)
//!     → middleware/gate.rs (run the gate, act on the Decision)
//!     → response.rs (preflight / redirect / reject, CORS headers on forwards)
//!     → application (proxied upstream or in-process Router)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{canonical_uri, GateRequest, MakeRequestUuid, X_REQUEST_ID};
pub use server::{proxy_router, HttpServer, Upstream};
