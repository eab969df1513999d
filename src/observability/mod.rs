//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the trace layer
//! - Only identity provider outages are logged as faults; access decisions are debug

pub mod logging;
pub mod metrics;
