//! Shared pieces of the ISS tracker: the proxy and static routes, the
//! position poller, and the map-scene projection.

use std::path::PathBuf;

use axum::{Router, routing::get};

pub mod assets;
pub mod error;
pub mod iss;
pub mod map;
pub mod tracker;

pub use error::{AppError, TrackError};
pub use tracker::{Position, Tracker, TrackerState};

/// State shared by the HTTP handlers. Nothing in here is mutable; the
/// reqwest client is reference-counted and cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub upstream_url: String,
    pub dist_dir: PathBuf,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_url: iss::UPSTREAM_URL.to_string(),
            dist_dir: PathBuf::from(assets::DIST_DIR),
        }
    }
}

/// The application router: the ISS proxy route plus the SPA fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(iss::ISS_ROUTE, get(iss::iss_now))
        .fallback(assets::serve_spa)
        .with_state(state)
}
