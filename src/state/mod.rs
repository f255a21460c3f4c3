//! Synchronized and local race state.
//!
//! [`SyncState`] is the single record every client of a team agrees on: lap
//! and stint counters, the pit stop in progress, the session identity and the
//! driver in the car. It is persisted as the `State` document of a session
//! collection and reloaded whenever this client takes over the car.
//!
//! [`LocalState`] holds what must never leave the process: connection status,
//! the running driver's user id, the derived session key and the last emitted
//! run/event payloads used for change detection.
//!
//! The trackers are split by concern:
//!
//! - [`session`]: session identity, single/team classification, key derivation
//! - [`pits`]: the pit stop phase machine and service capture
//! - [`laps`]: lap and stint counting
//! - [`driver`]: driver change detection

mod driver;
mod laps;
mod local;
mod pits;
mod session;

use serde::{Deserialize, Serialize};

use crate::types::{DayTime, TrackLocation};

pub use local::LocalState;
pub use pits::{PitPhase, PitService, PitStop};
pub use session::{SessionIdentity, SessionKeyInputs, SessionType, derive_session_key};

/// Race state shared by every client of a team.
///
/// Serialized with the camelCase field names of the `State` document. Missing
/// fields load as their defaults so documents written by older clients stay
/// readable.
///
/// `stintCount` is 0 in documents and `syncData` written before the first
/// lap change of a session. Consumers read 0 as "not started yet"; from the
/// first observed lap on it is at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SyncState {
    lap: i32,
    #[serde(rename = "lapTime")]
    last_lap_time: DayTime,
    /// 0 means no lap observed yet in this session; stints count from 1
    stint_count: u32,
    stint_lap: i32,
    track_location: TrackLocation,
    #[serde(flatten)]
    pit: PitStop,
    #[serde(flatten)]
    session: SessionIdentity,
    current_driver: String,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            lap: 0,
            last_lap_time: DayTime::ZERO,
            stint_count: 0,
            stint_lap: 0,
            track_location: TrackLocation::NotInWorld,
            pit: PitStop::default(),
            session: SessionIdentity::UNKNOWN,
            current_driver: String::new(),
        }
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last lap number observed.
    pub fn lap(&self) -> i32 {
        self.lap
    }

    pub fn last_lap_time(&self) -> DayTime {
        self.last_lap_time
    }

    /// Number of stints, 0 until the first lap is observed.
    pub fn stint_count(&self) -> u32 {
        self.stint_count
    }

    /// Laps completed in the current stint.
    pub fn stint_lap(&self) -> i32 {
        self.stint_lap
    }

    /// Last known location of the tracked car.
    pub fn track_location(&self) -> TrackLocation {
        self.track_location
    }

    /// Pit stop in progress, or the last completed one until it is reset.
    pub fn pit(&self) -> &PitStop {
        &self.pit
    }

    pub fn pit_phase(&self) -> PitPhase {
        self.pit.phase
    }

    pub fn session_identity(&self) -> SessionIdentity {
        self.session
    }

    /// Name of the driver currently in the car.
    pub fn current_driver(&self) -> &str {
        &self.current_driver
    }

    /// Clear lap, stint and pit progress for a new session.
    ///
    /// Session identity and the current driver are kept.
    pub fn reset_progress(&mut self) {
        *self = Self {
            session: self.session,
            current_driver: std::mem::take(&mut self.current_driver),
            ..Self::default()
        };
    }

    /// Adopt progress persisted by another client of the team.
    ///
    /// Lap, stint, location and pit fields come from `persisted`. Session
    /// identity and the current driver always come from this client's own
    /// telemetry, which is newer than any stored document.
    pub fn resync_from(&mut self, persisted: SyncState) {
        self.lap = persisted.lap;
        self.last_lap_time = persisted.last_lap_time;
        self.stint_count = persisted.stint_count;
        self.stint_lap = persisted.stint_lap;
        self.track_location = persisted.track_location;
        self.pit = persisted.pit;
    }
}
