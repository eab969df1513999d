//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! API request:
//!     → cors.rs (preflight answer or CORS headers for the response)
//!
//! Forwarded request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Pass to application
//! ```
//!
//! # Design Decisions
//! - Fail closed: a refused origin never gets CORS headers
//! - No trust in client input

pub mod cors;
pub mod headers;

pub use cors::{CorsConfigError, CorsResponder};
