//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! http::server handler
//!     → InboundRequest (method, raw path suffix, raw query, headers, body)
//!     → forwarder.rs (build target URL, whitelist headers, dispatch)
//!     → OutboundResult (always produced; errors are mapped, never raised)
//!     → http::response (written back to the caller)
//! ```
//!
//! # Design Decisions
//! - Path suffix and query are opaque byte sequences; no re-encoding
//! - Exactly one upstream attempt per inbound request; no retries
//! - The forwarder is infallible at its seam: every error becomes a response

pub mod forwarder;

pub use forwarder::{Forwarder, InboundRequest};
