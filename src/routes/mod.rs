//! HTTP route handlers.
//!
//! `/zone` carries a Cache-Control header since the value never changes while
//! the process runs. `/health` is never cached. Unknown paths get a JSON 404.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod zone;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_ZONE, JSON_CONTENT_TYPE};
use crate::error::AppError;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Build a response with an already-serialized JSON body.
///
/// The charset is spelled out in the content type, which `axum::Json` omits.
pub(crate) fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Zone - fixed for the process lifetime
    let zone_routes = Router::new()
        .route("/zone", get(zone::show))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_ZONE),
        ));

    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .merge(zone_routes)
        .merge(health_routes)
        .fallback(not_found)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
