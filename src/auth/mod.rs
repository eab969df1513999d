//! Authentication and authorization for non-API traffic.
//!
//! # Data Flow
//! ```text
//! Non-API request (gated path)
//!     → gate.rs: public path? forward without a session lookup
//!     → verifier.rs: resolve the session via the identity provider
//!     → gate.rs: session / role checks → forward or redirect
//! ```
//!
//! # Design Decisions
//! - Fail closed: any verification failure is treated as "no session"
//! - Only provider outages are logged as faults
//! - Role comparison is exact and case-sensitive

pub mod gate;
pub mod token;
pub mod verifier;

pub use gate::AuthGate;
pub use token::SessionToken;
pub use verifier::{
    has_session_cookie, IdentityClientError, RemoteSessionVerifier, SessionVerifier, VerifyError,
};
