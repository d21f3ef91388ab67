use crate::tracker::{Position, TrackerState};

/// OpenStreetMap tile template backing the map view.
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
/// Icon drawn at the live ISS position.
pub const ISS_ICON_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/d/d0/International_Space_Station.svg/1200px-International_Space_Station.svg.png";
pub const ISS_ICON_SIZE: (f64, f64) = (40.0, 25.0);
pub const ISS_ICON_ANCHOR: (f64, f64) = (20.0, 12.5);
pub const ISS_ICON_POPUP_ANCHOR: (f64, f64) = (0.0, -10.0);
/// Zoom level when the map first renders.
pub const INITIAL_ZOOM: u8 = 3;
pub const PATH_COLOR: &str = "#0d47a1";
pub const PATH_WEIGHT: u32 = 3;
pub const PATH_OPACITY: f64 = 0.8;
pub const MARKER_RADIUS: u32 = 2;
pub const LOADING_MESSAGE: &str = "Loading ISS position...";

/// Everything a map widget needs to draw one frame of the tracking view.
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub center: Position,
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
    pub trail: Option<Trail>,
    pub markers: Vec<TrailMarker>,
    pub iss: IssMarker,
}

/// The polyline through every recorded position, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub points: Vec<Position>,
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
}

/// A small dot on one recorded position with its index-labelled popup.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailMarker {
    pub position: Position,
    pub radius: u32,
    pub popup: Popup,
    pub current: bool,
}

/// The icon marker at the live position.
#[derive(Debug, Clone, PartialEq)]
pub struct IssMarker {
    pub position: Position,
    pub icon_url: &'static str,
    pub icon_size: (f64, f64),
    pub icon_anchor: (f64, f64),
    pub popup_anchor: (f64, f64),
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

/// Projects the view state into a drawable scene. Nothing to draw until the
/// first position is known.
pub fn scene(state: &TrackerState) -> Option<MapScene> {
    let center = state.position?;

    // The trail only appears once there are two points to connect.
    let trail = (state.path.len() > 1).then(|| Trail {
        points: state.path.clone(),
        color: PATH_COLOR,
        weight: PATH_WEIGHT,
        opacity: PATH_OPACITY,
    });

    let markers = state
        .path
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let current = index + 1 == state.path.len();
            let mut lines = vec![
                format!("Latitude: {:.4}", point.latitude),
                format!("Longitude: {:.4}", point.longitude),
            ];
            if current {
                lines.push("Current Position".to_string());
            }
            TrailMarker {
                position: *point,
                radius: MARKER_RADIUS,
                popup: Popup {
                    title: format!("Recorded Position #{}", index + 1),
                    lines,
                },
                current,
            }
        })
        .collect();

    Some(MapScene {
        center,
        zoom: INITIAL_ZOOM,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        trail,
        markers,
        iss: IssMarker {
            position: center,
            icon_url: ISS_ICON_URL,
            icon_size: ISS_ICON_SIZE,
            icon_anchor: ISS_ICON_ANCHOR,
            popup_anchor: ISS_ICON_POPUP_ANCHOR,
            popup: Popup {
                title: "International Space Station".to_string(),
                lines: vec![
                    format!("Latitude: {:.4}", center.latitude),
                    format!("Longitude: {:.4}", center.longitude),
                ],
            },
        },
    })
}

/// Footer line under the map.
pub fn position_caption(position: Position) -> String {
    format!(
        "Current Position: {:.4}° N, {:.4}° E",
        position.latitude, position.longitude
    )
}

/// Overlay line showing the age of the last successful update.
pub fn elapsed_caption(seconds: i64) -> String {
    format!("Last update: {seconds}s ago")
}

/// Footer line showing the wall-clock time of the last successful update.
pub fn last_update_caption(last_update: &str) -> String {
    format!("Last updated: {last_update}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{Timestamp, Zoned, tz::TimeZone};

    fn position(latitude: f64, longitude: f64) -> Position {
        Position { latitude, longitude }
    }

    fn zoned_at(ms: i64) -> Zoned {
        Timestamp::from_millisecond(ms)
            .unwrap()
            .to_zoned(TimeZone::UTC)
    }

    fn state_with(points: &[Position]) -> TrackerState {
        let mut state = TrackerState::new();
        for (i, point) in points.iter().enumerate() {
            state.record_position(*point, &zoned_at(i as i64 * 15_000));
        }
        state
    }

    #[test]
    fn no_scene_before_the_first_position() {
        assert_eq!(scene(&TrackerState::new()), None);
    }

    #[test]
    fn single_point_renders_without_a_trail() {
        let state = state_with(&[position(10.1234, 20.5678)]);
        let scene = scene(&state).unwrap();

        assert_eq!(scene.center, position(10.1234, 20.5678));
        assert_eq!(scene.zoom, INITIAL_ZOOM);
        assert_eq!(scene.trail, None);
        assert_eq!(scene.markers.len(), 1);
        assert!(scene.markers[0].current);
        assert_eq!(scene.iss.position, position(10.1234, 20.5678));
    }

    #[test]
    fn trail_connects_every_recorded_point_in_order() {
        let points = [position(1.0, 2.0), position(3.0, 4.0), position(5.0, 6.0)];
        let scene = scene(&state_with(&points)).unwrap();

        let trail = scene.trail.unwrap();
        assert_eq!(trail.points, points.to_vec());
        assert_eq!(trail.color, PATH_COLOR);
        assert_eq!(trail.weight, PATH_WEIGHT);
        assert_eq!(trail.opacity, PATH_OPACITY);
    }

    #[test]
    fn markers_are_numbered_and_only_the_last_is_current() {
        let points = [position(1.0, 2.0), position(3.0, 4.0), position(5.0, 6.0)];
        let scene = scene(&state_with(&points)).unwrap();

        assert_eq!(scene.markers.len(), 3);
        for (i, marker) in scene.markers.iter().enumerate() {
            assert_eq!(marker.popup.title, format!("Recorded Position #{}", i + 1));
            assert_eq!(marker.radius, MARKER_RADIUS);
            assert_eq!(marker.current, i == 2);
        }
        assert_eq!(
            scene.markers[2].popup.lines,
            vec![
                "Latitude: 5.0000".to_string(),
                "Longitude: 6.0000".to_string(),
                "Current Position".to_string(),
            ]
        );
        assert_eq!(
            scene.markers[0].popup.lines,
            vec!["Latitude: 1.0000".to_string(), "Longitude: 2.0000".to_string()]
        );
    }

    #[test]
    fn iss_marker_carries_the_icon_and_popup() {
        let scene = scene(&state_with(&[position(10.1234, 20.5678)])).unwrap();

        assert_eq!(scene.iss.icon_url, ISS_ICON_URL);
        assert_eq!(scene.iss.icon_size, ISS_ICON_SIZE);
        assert_eq!(scene.iss.icon_anchor, ISS_ICON_ANCHOR);
        assert_eq!(scene.iss.popup_anchor, ISS_ICON_POPUP_ANCHOR);
        assert_eq!(scene.iss.popup.title, "International Space Station");
        assert_eq!(
            scene.iss.popup.lines,
            vec![
                "Latitude: 10.1234".to_string(),
                "Longitude: 20.5678".to_string(),
            ]
        );
    }

    #[test]
    fn captions_format_coordinates_and_age() {
        assert_eq!(
            position_caption(position(10.1234, 20.5678)),
            "Current Position: 10.1234° N, 20.5678° E"
        );
        assert_eq!(elapsed_caption(42), "Last update: 42s ago");
        assert_eq!(last_update_caption("07:15:42"), "Last updated: 07:15:42");
    }
}
