//! HTTP server module.
//!
//! Serves the router over plain HTTP and drains connections on SIGTERM/SIGINT.
//! TLS is expected to be terminated in front of this service.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
