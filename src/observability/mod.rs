//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handlers produce:
//!     → tracing events (structured fields: request_id, method, status)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log events
//! - Metric updates are cheap (atomic increments)
//! - Recording is unconditional; without an installed recorder it is a no-op

pub mod metrics;
