//! Zone reporting handler.

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::instrument;

use super::json_response;
use crate::error::AppError;
use crate::state::AppState;
use crate::zone::ZoneResponse;

/// `GET /zone`: the configured zone as `{"zone":"<value>"}`.
#[instrument(name = "zone::show", skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = serde_json::to_string(&ZoneResponse::from(&state.zone))?;
    tracing::debug!(zone = %state.zone, "Reporting zone");
    Ok(json_response(StatusCode::OK, body))
}
