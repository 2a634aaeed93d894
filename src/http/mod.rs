//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all proxy routes, middleware)
//!     → request.rs (add request ID)
//!     → proxy::Forwarder (upstream dispatch)
//!     → response.rs (OutboundResult written back to the caller)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use response::OutboundResult;
pub use server::HttpServer;
