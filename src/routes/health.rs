//! Health check endpoint for container orchestration.
//!
//! A liveness probe only: it reports that this process can answer HTTP and
//! says nothing about any other service.

/// Health check handler.
pub async fn health() -> &'static str {
    "ok"
}
