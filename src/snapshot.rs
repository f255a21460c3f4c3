//! Frozen, typed view of one telemetry tick.
//!
//! A [`Snapshot`] pairs the per-tick variables ([`TelemetryFrame`]) with the
//! session string that was current when they were sampled. Everything the
//! trackers read goes through the getters here; cross-field lookups (driver
//! index into the driver table and into the per-car arrays) are validated
//! once in [`Snapshot::new`] so a tick can never observe a torn view.
//!
//! Durations and timestamps leave the snapshot as [`DayTime`]; the raw frame
//! keeps the simulator's seconds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::session::{Driver, Session};
use crate::state::{PitService, SessionIdentity, SessionKeyInputs};
use crate::types::{BitField, DayTime, TrackLocation};
use crate::{Result, SessionInfo, SyncError};

/// Telemetry variables sampled once per tick, named as the simulator names them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TelemetryFrame {
    /// Seconds since session start
    pub session_time: f64,
    /// Index into the session list
    pub session_num: i32,
    /// `irsdk_Flags` bitfield
    pub session_flags: u32,
    /// Laps completed by the player car
    pub lap_completed: i32,
    /// Last lap time in seconds, <= 0 when unknown
    pub lap_last_lap_time: f32,
    /// Fuel level in liters
    pub fuel_level: f32,
    /// Track surface temperature in °C
    pub track_temp: f32,
    /// Player car between the pit cones
    pub on_pit_road: bool,
    /// Track surface per car index (`irsdk_TrkLoc`)
    pub car_idx_track_surface: Vec<i32>,
    /// Requested pit services (`irsdk_PitSvFlags`)
    pub pit_sv_flags: u32,
    /// Mandatory repair time left in seconds
    pub pit_repair_left: f32,
    /// Optional repair time left in seconds
    pub pit_opt_repair_left: f32,
    /// Tow time left in seconds
    pub player_car_tow_time: f32,
}

/// One tick of telemetry with validated cross-field references.
#[derive(Debug, Clone)]
pub struct Snapshot {
    frame: TelemetryFrame,
    session: Arc<SessionInfo>,
    car_idx: usize,
    driver: Driver,
}

impl Snapshot {
    /// Validate a frame against its session string.
    ///
    /// Fails when the driver car index cannot be resolved in the driver table
    /// or in the per-car arrays.
    pub fn new(frame: TelemetryFrame, session: Arc<SessionInfo>) -> Result<Self> {
        let driver_info = session
            .driver_info
            .as_ref()
            .ok_or_else(|| SyncError::FieldNotFound { field: "DriverInfo".to_string() })?;

        let car_idx = driver_info
            .driver_car_idx
            .ok_or_else(|| SyncError::FieldNotFound { field: "DriverInfo.DriverCarIdx".to_string() })?;

        let driver = driver_info.driver_for_car(car_idx).cloned().ok_or_else(|| {
            SyncError::FieldNotFound { field: format!("DriverInfo.Drivers[CarIdx={car_idx}]") }
        })?;

        let idx = usize::try_from(car_idx)
            .map_err(|_| SyncError::parse("Snapshot validation", format!("Negative car index {car_idx}")))?;

        if idx >= frame.car_idx_track_surface.len() {
            return Err(SyncError::FieldNotFound { field: format!("CarIdxTrackSurface[{idx}]") });
        }

        Ok(Self { frame, session, car_idx: idx, driver })
    }

    /// Raw per-tick variables.
    pub fn frame(&self) -> &TelemetryFrame {
        &self.frame
    }

    /// Session string this tick belongs to.
    pub fn session_info(&self) -> &SessionInfo {
        &self.session
    }

    /// Index of the tracked car.
    pub fn car_idx(&self) -> usize {
        self.car_idx
    }

    /// Driver currently in the tracked car.
    pub fn running_driver(&self) -> &Driver {
        &self.driver
    }

    /// Session identity triple.
    pub fn session_identity(&self) -> SessionIdentity {
        let (session_id, sub_session_id) = self.session.weekend_info.session_ids();
        SessionIdentity::new(session_id, sub_session_id, self.frame.session_num)
    }

    /// Inputs for deriving the session key.
    pub fn key_inputs(&self) -> SessionKeyInputs<'_> {
        SessionKeyInputs {
            identity: self.session_identity(),
            team_id: self.team_id(),
            team_name: self.driver.team_name.as_deref().unwrap_or(&self.driver.user_name),
            car_path: self.driver.car_path.as_deref().unwrap_or_default(),
            track_name: &self.session.weekend_info.track_name,
        }
    }

    /// Team of the tracked car, 0 outside team sessions.
    pub fn team_id(&self) -> i32 {
        self.driver.team_id.unwrap_or(0)
    }

    /// Entry of the current session in the session list.
    pub fn current_session(&self) -> Option<&Session> {
        self.session.session_info.session(self.frame.session_num)
    }

    /// Session clock.
    pub fn session_time(&self) -> DayTime {
        DayTime::from_seconds(self.frame.session_time)
    }

    /// Track surface of the tracked car.
    pub fn car_track_location(&self) -> TrackLocation {
        TrackLocation::from(self.frame.car_idx_track_surface[self.car_idx])
    }

    pub fn lap_completed(&self) -> i32 {
        self.frame.lap_completed
    }

    /// Last lap time, zero while the simulator has none.
    pub fn last_lap_time(&self) -> DayTime {
        DayTime::from_seconds(f64::from(self.frame.lap_last_lap_time.max(0.0)))
    }

    pub fn fuel_level(&self) -> f32 {
        self.frame.fuel_level
    }

    pub fn track_temp(&self) -> f32 {
        self.frame.track_temp
    }

    pub fn on_pit_road(&self) -> bool {
        self.frame.on_pit_road
    }

    pub fn session_flags(&self) -> BitField {
        BitField::new(self.frame.session_flags)
    }

    /// Service request and repair/tow times as one reading.
    pub fn pit_service(&self) -> PitService {
        PitService {
            flags: BitField::new(self.frame.pit_sv_flags),
            repair_left: DayTime::from_seconds(f64::from(self.frame.pit_repair_left)),
            opt_repair_left: DayTime::from_seconds(f64::from(self.frame.pit_opt_repair_left)),
            tow_time: DayTime::from_seconds(f64::from(self.frame.player_car_tow_time)),
        }
    }

    /// Estimated lap time of the player car.
    pub fn estimated_lap_time(&self) -> DayTime {
        let seconds = self
            .session
            .driver_info
            .as_ref()
            .and_then(|info| info.driver_car_est_lap_time)
            .unwrap_or(0.0);
        DayTime::from_seconds(seconds)
    }

    /// Usable fuel capacity in liters.
    pub fn max_fuel(&self) -> f64 {
        self.session.driver_info.as_ref().map(|info| info.max_fuel()).unwrap_or(0.0)
    }

    pub fn track_name(&self) -> &str {
        &self.session.weekend_info.track_name
    }
}
