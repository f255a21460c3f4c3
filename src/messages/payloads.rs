//! Payload composition from sync state and snapshot fields.

use serde::Serialize;

use crate::snapshot::Snapshot;
use crate::state::{PitPhase, SyncState};
use crate::types::{BitField, DayTime};

/// Session description, emitted once per session identity change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoPayload {
    /// Client version
    pub version: String,
    pub session_id: String,
    pub track: String,
    /// `None` when unlimited
    pub session_laps: Option<u32>,
    /// `None` when unlimited
    pub session_time: Option<DayTime>,
    pub session_type: String,
    pub team_name: String,
    pub car: String,
    pub max_fuel: f64,
}

impl SessionInfoPayload {
    pub fn from_snapshot(session_key: &str, snapshot: &Snapshot) -> Self {
        let session = snapshot.current_session();
        let driver = snapshot.running_driver();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            session_id: session_key.to_string(),
            track: snapshot.track_name().to_string(),
            session_laps: session.and_then(|s| s.lap_limit()),
            session_time: session.and_then(|s| s.time_limit()),
            session_type: session.map(|s| s.session_type.clone()).unwrap_or_default(),
            team_name: driver.team_name.clone().unwrap_or_default(),
            car: driver.car_screen_name.clone().unwrap_or_default(),
            max_fuel: snapshot.max_fuel(),
        }
    }
}

/// One completed lap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LapData {
    pub lap: i32,
    pub stint_lap: i32,
    pub stint_count: u32,
    pub driver: String,
    #[serde(rename = "laptime")]
    pub lap_time: DayTime,
    pub fuel_level: f32,
    pub track_temp: f32,
    pub session_time: DayTime,
}

impl LapData {
    pub fn compose(state: &SyncState, snapshot: &Snapshot) -> Self {
        Self {
            lap: state.lap(),
            stint_lap: state.stint_lap(),
            stint_count: state.stint_count(),
            driver: state.current_driver().to_string(),
            lap_time: state.last_lap_time(),
            fuel_level: snapshot.fuel_level(),
            track_temp: snapshot.track_temp(),
            session_time: snapshot.session_time(),
        }
    }
}

/// One completed pit cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitstopData {
    /// Stint that ended with this stop, counted from 0
    pub stint: u32,
    pub lap: i32,
    pub driver: String,
    pub enter_pits: DayTime,
    pub stop_moving: DayTime,
    pub start_moving: DayTime,
    pub exit_pits: DayTime,
    pub service_flags: BitField,
    pub services: Vec<&'static str>,
    pub repair_left: DayTime,
    pub opt_repair_left: DayTime,
    pub tow_time: DayTime,
}

impl PitstopData {
    pub fn from_state(state: &SyncState) -> Self {
        let pit = state.pit();
        Self {
            stint: state.stint_count().saturating_sub(1),
            lap: state.lap(),
            driver: state.current_driver().to_string(),
            enter_pits: pit.enter_pits,
            stop_moving: pit.stop_moving,
            start_moving: pit.start_moving,
            exit_pits: pit.exit_pits,
            service_flags: pit.service_flags,
            services: pit.service_flags.pit_service_names(),
            repair_left: pit.pit_repair_left,
            opt_repair_left: pit.pit_opt_repair_left,
            tow_time: pit.tow_time,
        }
    }
}

/// Fuel, flags and pace while the local user drives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    pub session_time: DayTime,
    pub fuel_level: f32,
    pub flags: Vec<&'static str>,
    pub est_lap_time: DayTime,
}

impl RunData {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            session_time: snapshot.session_time(),
            fuel_level: snapshot.fuel_level(),
            flags: snapshot.session_flags().session_flag_names(),
            est_lap_time: snapshot.estimated_lap_time(),
        }
    }

    /// Fuel, flags or estimated lap time differ. Session time is ignored.
    pub fn changed_since(&self, previous: &RunData) -> bool {
        self.fuel_level != previous.fuel_level
            || self.flags != previous.flags
            || self.est_lap_time != previous.est_lap_time
    }

    /// Tank reads empty, which the simulator also reports while loading.
    pub fn is_empty_tank(&self) -> bool {
        self.fuel_level <= 0.0
    }
}

/// Location, flag and pit-service changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub session_time: DayTime,
    pub track_location: &'static str,
    pub on_pit_road: bool,
    pub flags: Vec<&'static str>,
    pub tow_time: DayTime,
    pub repair_left: DayTime,
    pub opt_repair_left: DayTime,
}

impl EventData {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let service = snapshot.pit_service();
        Self {
            session_time: snapshot.session_time(),
            track_location: snapshot.car_track_location().as_str(),
            on_pit_road: snapshot.on_pit_road(),
            flags: snapshot.session_flags().session_flag_names(),
            tow_time: service.tow_time,
            repair_left: service.repair_left,
            opt_repair_left: service.opt_repair_left,
        }
    }

    /// Anything but the session time differs.
    pub fn changed_since(&self, previous: &EventData) -> bool {
        self.track_location != previous.track_location
            || self.on_pit_road != previous.on_pit_road
            || self.flags != previous.flags
            || self.tow_time != previous.tow_time
            || self.repair_left != previous.repair_left
            || self.opt_repair_left != previous.opt_repair_left
    }
}

/// Periodic heartbeat for remote observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub session_time: DayTime,
    pub lap: i32,
    /// 0 until the first lap change of the session
    pub stint_count: u32,
    pub stint_lap: i32,
    pub driver: String,
    pub track_location: &'static str,
    pub pit_state: PitPhase,
    pub fuel_level: f32,
}

impl SyncData {
    pub fn compose(state: &SyncState, snapshot: &Snapshot) -> Self {
        Self {
            session_time: snapshot.session_time(),
            lap: state.lap(),
            stint_count: state.stint_count(),
            stint_lap: state.stint_lap(),
            driver: state.current_driver().to_string(),
            track_location: snapshot.car_track_location().as_str(),
            pit_state: state.pit_phase(),
            fuel_level: snapshot.fuel_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{frame_at, single_session, team_snapshot};
    use crate::types::irsdk_flags::{pit_service, session_flags};
    use crate::types::TrackLocation;

    #[test]
    fn session_info_converts_limits() {
        let snapshot = team_snapshot(TrackLocation::OnTrack, 1.0, 0);
        let info = SessionInfoPayload::from_snapshot("Night Owls@1000#2000#0", &snapshot);

        assert_eq!(info.track, "spa");
        assert_eq!(info.session_laps, None);
        assert_eq!(info.session_time, Some(DayTime::from_days(0.25)));
        assert_eq!(info.session_type, "Race");
        assert_eq!(info.team_name, "Night Owls");
        assert_eq!(info.car, "Porsche 911 GT3 Cup (992)");
        assert!((info.max_fuel - 90.0).abs() < 1e-9);

        let json = serde_json::to_value(&info).unwrap();
        assert!(json["sessionLaps"].is_null());
        assert_eq!(json["sessionTime"], 0.25);
        assert_eq!(json["sessionId"], "Night Owls@1000#2000#0");
    }

    #[test]
    fn single_session_info_has_lap_limit_and_no_time_limit() {
        let snapshot = Snapshot::new(frame_at(TrackLocation::OnTrack, 1.0, 0), single_session()).unwrap();
        let info = SessionInfoPayload::from_snapshot("Alice@porsche992cup#spa#0", &snapshot);
        assert_eq!(info.session_laps, Some(30));
        assert_eq!(info.session_time, None);
        assert_eq!(info.team_name, "");
    }

    #[test]
    fn lap_data_takes_counters_from_state() {
        let mut state = SyncState::new();
        state.update_driver("Alice");
        state.update_lap(6, DayTime::from_seconds(138.0));
        let snapshot = team_snapshot(TrackLocation::OnTrack, 8640.0, 6);

        let lap = LapData::compose(&state, &snapshot);
        assert_eq!(lap.lap, 6);
        assert_eq!(lap.stint_lap, 6);
        assert_eq!(lap.stint_count, 1);
        assert_eq!(lap.driver, "Alice");
        assert_eq!(lap.session_time, DayTime::from_days(0.1));

        let json = serde_json::to_value(&lap).unwrap();
        assert!(json.get("laptime").is_some());
    }

    #[test]
    fn pitstop_reports_finished_stint() {
        let mut state = SyncState::new();
        state.update_lap(20, DayTime::ZERO);
        state.capture_service(
            &crate::state::PitService {
                flags: BitField::new(pit_service::FUEL_FILL | pit_service::LF_TIRE_CHANGE),
                ..Default::default()
            },
            20,
        );
        for (t, location) in [
            TrackLocation::OnTrack,
            TrackLocation::ApproachingPits,
            TrackLocation::InPitStall,
            TrackLocation::ApproachingPits,
            TrackLocation::OnTrack,
        ]
        .into_iter()
        .enumerate()
        {
            state.update_pits(location, DayTime::from_days(0.2 + t as f64 * 0.001), 20);
        }

        let stop = PitstopData::from_state(&state);
        assert_eq!(stop.stint, 1);
        assert_eq!(stop.lap, 20);
        assert_eq!(stop.services, vec!["LF_TIRE", "FUEL"]);
        assert!(stop.enter_pits < stop.exit_pits);
    }

    #[test]
    fn pitstop_stint_never_underflows() {
        assert_eq!(PitstopData::from_state(&SyncState::new()).stint, 0);
    }

    #[test]
    fn run_data_change_ignores_clock() {
        let first = RunData::from_snapshot(&team_snapshot(TrackLocation::OnTrack, 10.0, 3));
        let later = RunData::from_snapshot(&team_snapshot(TrackLocation::OnTrack, 20.0, 3));
        assert!(!later.changed_since(&first));

        let mut frame = frame_at(TrackLocation::OnTrack, 30.0, 3);
        frame.session_flags = session_flags::YELLOW;
        let flagged = RunData::from_snapshot(&Snapshot::new(frame, crate::test_utils::team_session()).unwrap());
        assert!(flagged.changed_since(&first));
        assert_eq!(flagged.flags, vec!["YELLOW"]);
    }

    #[test]
    fn event_reports_location_name() {
        let pits = EventData::from_snapshot(&team_snapshot(TrackLocation::ApproachingPits, 10.0, 3));
        let track = EventData::from_snapshot(&team_snapshot(TrackLocation::OnTrack, 10.0, 3));
        assert_eq!(pits.track_location, "ApproachingPits");
        assert!(pits.on_pit_road);
        assert!(track.changed_since(&pits));
    }

    #[test]
    fn sync_data_reports_pit_phase() {
        let state = SyncState::new();
        let sync = SyncData::compose(&state, &team_snapshot(TrackLocation::OnTrack, 10.0, 3));
        let json = serde_json::to_value(&sync).unwrap();
        assert_eq!(json["pitState"], "NONE");
        assert_eq!(json["trackLocation"], "OnTrack");
    }
}
