//! Request gate: CORS for API traffic, session authorization for the rest.

pub mod auth;
pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::GateConfig;
pub use gate::{Decision, Gate, RedirectKind};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
