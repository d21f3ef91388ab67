use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body of the fixed 500 payload returned when the upstream fetch fails.
pub const UPSTREAM_FETCH_ERROR: &str = "Failed to fetch ISS position";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Status(StatusCode),
    #[error("failed to fetch ISS position from upstream")]
    UpstreamFetch,
    #[error(transparent)]
    TraceExporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Status(status) => status.into_response(),
            AppError::UpstreamFetch => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": UPSTREAM_FETCH_ERROR })),
            )
                .into_response(),
            other => {
                error!(message = "Unhandled application error", error = %other);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Transport and decode failures behind a single client-side fetch cycle.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("could not parse ISS coordinate: {0}")]
    Coordinate(#[from] std::num::ParseFloatError),
}
