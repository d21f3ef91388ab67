use std::env;
use std::time::Duration;

use iss_tracker::{Tracker, map};
use tokio::{signal, time};
use tracing::{error, info, warn};

const DEFAULT_ENDPOINT: &str = "http://localhost:3001/iss-now/v1/";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded .env file"),
        Err(_) => warn!("Failed to load .env file"),
    };

    let endpoint = env::vars()
        .find(|v| v.0.eq("ISS_PROXY_URL"))
        .map(|v| v.1)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    info!(message = "Watching ISS position", endpoint = %endpoint);
    info!(message = map::LOADING_MESSAGE);

    let mut tracker = Tracker::new(endpoint);
    tracker.start();

    tokio::select! {
        _ = report(&tracker) => {},
        _ = shutdown_signal() => {},
    }

    tracker.stop();
    info!("Tracker stopped");
}

/// Once a second: print every newly recorded position from the projected
/// scene, plus error-state transitions.
async fn report(tracker: &Tracker) {
    let mut timer = time::interval(Duration::from_secs(1));
    let mut reported = 0usize;
    let mut in_error = false;

    loop {
        timer.tick().await;
        let state = tracker.snapshot();

        match &state.error {
            Some(message) => {
                if !in_error {
                    error!(message = %message);
                    in_error = true;
                }
            }
            None => in_error = false,
        }

        let Some(scene) = map::scene(&state) else {
            continue;
        };
        if scene.markers.len() > reported {
            for marker in &scene.markers[reported..] {
                info!(
                    message = %marker.popup.title,
                    latitude = marker.position.latitude,
                    longitude = marker.position.longitude,
                );
            }
            reported = scene.markers.len();
            info!(
                message = %map::position_caption(scene.center),
                updated = %map::last_update_caption(&state.last_update),
                age = %map::elapsed_caption(state.seconds_since_update),
            );
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, shutting down")
        },
        _ = terminate => {
            info!("SIGTERM received, shutting down")
        },
    }
}
