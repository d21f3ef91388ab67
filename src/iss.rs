use axum::{Json, extract::State};
use serde_json::Value;
use tracing::error;

use crate::{AppState, error::AppError};

/// Route the tracking view polls for the current ISS position.
pub const ISS_ROUTE: &str = "/iss-now/v1/";
/// Public Open Notify endpoint the proxy forwards to.
pub const UPSTREAM_URL: &str = "http://api.open-notify.org/iss-now.json";

/// Proxies the Open Notify API: one outbound request per inbound request,
/// upstream body passed through on success, fixed 500 payload on any failure.
#[tracing::instrument(skip_all)]
pub async fn iss_now(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let response = state
        .client
        .get(&state.upstream_url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| {
            error!(message = "Error fetching ISS location", error = %e);
            AppError::UpstreamFetch
        })?;

    let data: Value = response.json().await.map_err(|e| {
        error!(message = "Error decoding ISS location payload", error = %e);
        AppError::UpstreamFetch
    })?;

    Ok(Json(data))
}
