//! Fixtures shared by the unit tests.
//!
//! Session strings live under `tests/fixtures/` so the integration tests and
//! the recordings read the same data. Both describe Spa with the local user
//! (Alice, user id 101) in car index 2.

#![cfg(test)]

use std::sync::Arc;

use crate::schema::{SessionInfo, SessionInfoParser};
use crate::snapshot::{Snapshot, TelemetryFrame};
use crate::types::TrackLocation;

/// Team race: session 1000/2000, team 99 "Night Owls".
pub const TEAM_SESSION_YAML: &str = include_str!("../tests/fixtures/team_session.yaml");

/// Offline test session: session id 0, no team.
pub const SINGLE_SESSION_YAML: &str = include_str!("../tests/fixtures/single_session.yaml");

/// Car index of the local user in both fixtures.
pub const PLAYER_CAR_IDX: usize = 2;

/// User id of the local user in both fixtures.
pub const PLAYER_USER_ID: i32 = 101;

pub fn team_session() -> Arc<SessionInfo> {
    parse_fixture(TEAM_SESSION_YAML)
}

pub fn single_session() -> Arc<SessionInfo> {
    parse_fixture(SINGLE_SESSION_YAML)
}

fn parse_fixture(yaml: &str) -> Arc<SessionInfo> {
    Arc::new(SessionInfoParser::new().parse(yaml).expect("fixture session string must parse"))
}

/// A frame with the player car at `location`, fuel in the tank.
pub fn frame_at(location: TrackLocation, session_seconds: f64, lap: i32) -> TelemetryFrame {
    let mut surfaces = vec![i32::from(TrackLocation::OnTrack); 4];
    surfaces[PLAYER_CAR_IDX] = i32::from(location);

    TelemetryFrame {
        session_time: session_seconds,
        session_num: 0,
        lap_completed: lap,
        fuel_level: 42.0,
        track_temp: 31.5,
        on_pit_road: matches!(location, TrackLocation::ApproachingPits | TrackLocation::InPitStall),
        car_idx_track_surface: surfaces,
        ..Default::default()
    }
}

/// Team-session snapshot with the player car at `location`.
pub fn team_snapshot(location: TrackLocation, session_seconds: f64, lap: i32) -> Snapshot {
    Snapshot::new(frame_at(location, session_seconds, lap), team_session())
        .expect("fixture snapshot must validate")
}
