//! Credentialed upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamConfig
//!     → client.rs (build reqwest client, strip version segment)
//!     → UpstreamClient (shared via Arc, safe for concurrent use)
//!
//! Per request:
//!     forwarder → UpstreamClient::send
//!         → Ok(UpstreamResponse)              (status < 400)
//!         → Err(UpstreamError::Service{..})   (status ≥ 400, structured detail)
//!         → Err(UpstreamError::Transport(..)) (connect/timeout/IO failure)
//! ```
//!
//! # Design Decisions
//! - One client for the process lifetime; connection pooling is internal
//! - Error statuses surface as structured errors, mirroring SDK-style clients
//! - Credential handling is a black box: a static bearer token, if configured

pub mod client;

pub use client::{UpstreamClient, UpstreamError, UpstreamResponse};
