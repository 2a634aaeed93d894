//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup: load config → validate → build client/forwarder → serve
//! Shutdown: SIGINT → Shutdown::trigger → server drains → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
