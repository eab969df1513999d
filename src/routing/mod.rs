//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → path.rs (canonical spelling of the path)
//!     → classifier.rs (API vs non-API, prefix check)
//!     → matcher.rs (is the non-API path gated at all?)
//!
//! Pattern Compilation (at startup):
//!     RoutesConfig
//!     → PathPattern::parse for every pattern
//!     → Freeze as immutable RouteMatcher
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - No regex in hot path (segment and prefix comparisons only)
//! - Deterministic: same path always yields the same answer
//! - Every decision is made on the canonical path, the same one forwarded

pub mod classifier;
pub mod matcher;
pub mod path;

pub use classifier::{PathClassifier, Traffic};
pub use matcher::{PathPattern, PatternError, RouteMatcher};
pub use path::canonical_path;
