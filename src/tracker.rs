use std::sync::{Arc, Mutex};
use std::time::Duration;

use jiff::{Timestamp, Zoned};
use serde::Deserialize;
use tokio::{task::JoinHandle, time};
use tracing::{error, info};

use crate::error::TrackError;

/// Cadence of the position fetch timer.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(15);
/// Cadence of the cosmetic elapsed-seconds timer.
pub const DISPLAY_INTERVAL: Duration = Duration::from_secs(1);
/// Message shown while the tracker sits in the errored state.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch ISS position. Please try again later.";

/// A tracked latitude/longitude pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Wire shape of the Open Notify payload; coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct IssNow {
    pub message: String,
    pub timestamp: i64,
    pub iss_position: IssPosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssPosition {
    pub latitude: String,
    pub longitude: String,
}

impl TryFrom<&IssPosition> for Position {
    type Error = std::num::ParseFloatError;

    fn try_from(wire: &IssPosition) -> Result<Self, Self::Error> {
        Ok(Position {
            latitude: wire.latitude.parse()?,
            longitude: wire.longitude.parse()?,
        })
    }
}

/// In-memory record driving the tracking view. Mutated only by fetch
/// completions and the one-second display tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    pub position: Option<Position>,
    pub path: Vec<Position>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_update: String,
    pub last_update_time: Timestamp,
    pub seconds_since_update: i64,
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            position: None,
            path: Vec::new(),
            loading: true,
            error: None,
            last_update: String::new(),
            last_update_time: Timestamp::now(),
            seconds_since_update: 0,
        }
    }

    /// Applies a successful fetch: the position becomes current, the history
    /// grows unless the coordinates repeat the last entry, and the update
    /// clocks reset.
    pub fn record_position(&mut self, position: Position, now: &Zoned) {
        self.position = Some(position);
        // Only the immediately preceding entry is compared; revisited
        // positions further back are recorded again.
        let repeats_last = self.path.last().is_some_and(|last| {
            last.latitude == position.latitude && last.longitude == position.longitude
        });
        if !repeats_last {
            self.path.push(position);
        }
        self.last_update = now.strftime("%H:%M:%S").to_string();
        self.last_update_time = now.timestamp();
        self.seconds_since_update = 0;
        self.loading = false;
        self.error = None;
    }

    /// Applies a failed fetch: only the error indicator changes, position and
    /// history keep their last-known values.
    pub fn record_failure(&mut self) {
        self.error = Some(FETCH_ERROR_MESSAGE.to_string());
        self.loading = false;
    }

    /// Recomputes the elapsed-seconds display from the last successful update.
    pub fn tick(&mut self, now: Timestamp) {
        self.seconds_since_update =
            (now.as_millisecond() - self.last_update_time.as_millisecond()) / 1000;
    }
}

async fn request_position(
    client: &reqwest::Client,
    endpoint: &str,
) -> Result<Position, TrackError> {
    let data: IssNow = client
        .get(endpoint)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(Position::try_from(&data.iss_position)?)
}

async fn fetch_position(client: &reqwest::Client, endpoint: &str, state: &Mutex<TrackerState>) {
    info!(message = "Fetching ISS position", timestamp = %Timestamp::now());
    match request_position(client, endpoint).await {
        Ok(position) => {
            let now = Zoned::now();
            state.lock().unwrap().record_position(position, &now);
        }
        Err(e) => {
            error!(message = "Error fetching ISS position", error = %e);
            state.lock().unwrap().record_failure();
        }
    }
}

/// Lifecycle owner of the polling loop: acquires the fetch and display
/// timers on `start` and guarantees both die on `stop` or drop.
pub struct Tracker {
    state: Arc<Mutex<TrackerState>>,
    client: reqwest::Client,
    endpoint: String,
    update_interval: Duration,
    display_interval: Duration,
    fetch_task: Option<JoinHandle<()>>,
    display_task: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Tracker polling `endpoint` at the production 15 s / 1 s cadence.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_intervals(endpoint, UPDATE_INTERVAL, DISPLAY_INTERVAL)
    }

    /// Tracker with custom timer cadences; tests run the loop at millisecond
    /// pace.
    pub fn with_intervals(
        endpoint: impl Into<String>,
        update_interval: Duration,
        display_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState::new())),
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            update_interval,
            display_interval,
            fetch_task: None,
            display_task: None,
        }
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> TrackerState {
        self.state.lock().unwrap().clone()
    }

    /// One fetch cycle on demand, independent of the timers. This is the
    /// retry affordance of the errored state.
    pub async fn fetch_now(&self) {
        fetch_position(&self.client, &self.endpoint, &self.state).await;
    }

    /// Arms both timers: an immediate fetch followed by one per update
    /// interval, and the once-a-second display tick. No-op while running.
    pub fn start(&mut self) {
        if self.fetch_task.is_some() {
            return;
        }

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let state = Arc::clone(&self.state);
        let update_interval = self.update_interval;
        self.fetch_task = Some(tokio::spawn(async move {
            let mut timer = time::interval(update_interval);
            loop {
                timer.tick().await;
                fetch_position(&client, &endpoint, &state).await;
            }
        }));

        let state = Arc::clone(&self.state);
        let display_interval = self.display_interval;
        self.display_task = Some(tokio::spawn(async move {
            let mut timer = time::interval(display_interval);
            loop {
                timer.tick().await;
                state.lock().unwrap().tick(Timestamp::now());
            }
        }));
    }

    /// Cancels both timers. Safe to call repeatedly; dropping the tracker
    /// calls it as well.
    pub fn stop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some(task) = self.display_task.take() {
            task.abort();
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}
