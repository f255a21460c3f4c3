//! Pit stop phase machine.
//!
//! A pit stop is one forward-only cycle through four track-location
//! transitions, each stamped with the session time it was observed at:
//!
//! ```text
//! NONE --(ApproachingPits|InPitStall)--> ENTERED   enterPits
//! ENTERED --(InPitStall)--> SERVICING              stopMoving
//! SERVICING --(ApproachingPits)--> EXITING         startMoving
//! EXITING --(OnTrack)--> NONE                      exitPits, new stint
//! ```
//!
//! Only changes of location are evaluated. A completed cycle stays in place
//! until [`SyncState::reset_pitstop`] so it can be emitted exactly once.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SyncState;
use crate::types::{BitField, DayTime, TrackLocation};

/// Phase of the pit stop in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitPhase {
    #[default]
    None,
    Entered,
    Servicing,
    Exiting,
}

/// Service request, repair and tow times read from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitService {
    pub flags: BitField,
    pub repair_left: DayTime,
    pub opt_repair_left: DayTime,
    pub tow_time: DayTime,
}

/// Timestamps and captured service data of one pit stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PitStop {
    pub enter_pits: DayTime,
    pub stop_moving: DayTime,
    pub start_moving: DayTime,
    pub exit_pits: DayTime,
    pub pit_repair_left: DayTime,
    pub pit_opt_repair_left: DayTime,
    pub tow_time: DayTime,
    pub service_flags: BitField,
    #[serde(rename = "pitState")]
    pub phase: PitPhase,
}

impl PitStop {
    /// Both ends of the cycle have been stamped.
    pub fn is_complete(&self) -> bool {
        self.enter_pits.is_set() && self.exit_pits.is_set()
    }

    /// Time spent in the pit lane.
    pub fn lane_time(&self) -> DayTime {
        DayTime::from_days((self.exit_pits.days() - self.enter_pits.days()).max(0.0))
    }

    /// Time spent stationary in the box.
    pub fn service_time(&self) -> DayTime {
        DayTime::from_days((self.start_moving.days() - self.stop_moving.days()).max(0.0))
    }
}

impl SyncState {
    /// Feed one track-location observation into the phase machine.
    ///
    /// Returns the phase entered when a transition happened. Observations on
    /// lap 1 or earlier are ignored entirely: the car starts the race from
    /// the pit box and that must not count as a stop.
    pub fn update_pits(
        &mut self,
        location: TrackLocation,
        session_time: DayTime,
        current_lap: i32,
    ) -> Option<PitPhase> {
        if current_lap <= 1 || !location.is_known() || location == self.track_location {
            return None;
        }
        self.track_location = location;

        let pit = &mut self.pit;
        let next = match (pit.phase, location) {
            (PitPhase::None, TrackLocation::ApproachingPits | TrackLocation::InPitStall) => {
                if pit.is_complete() {
                    warn!("Previous pit stop not flushed yet, ignoring pit entry");
                    return None;
                }
                pit.enter_pits = session_time;
                if location == TrackLocation::InPitStall {
                    // Towed or reset straight into the box
                    pit.stop_moving = session_time;
                    PitPhase::Servicing
                } else {
                    PitPhase::Entered
                }
            }
            (PitPhase::Entered, TrackLocation::InPitStall) => {
                pit.stop_moving = session_time;
                PitPhase::Servicing
            }
            (PitPhase::Entered, TrackLocation::OnTrack) => {
                debug!("Pit lane drive-through, discarding pit cycle");
                self.reset_pitstop();
                return None;
            }
            (PitPhase::Servicing, TrackLocation::ApproachingPits) => {
                pit.start_moving = session_time;
                PitPhase::Exiting
            }
            (PitPhase::Exiting, TrackLocation::OnTrack) => {
                pit.exit_pits = session_time;
                self.stint_count += 1;
                self.stint_lap = 0;
                PitPhase::None
            }
            _ => return None,
        };

        self.pit.phase = next;
        Some(next)
    }

    /// Latch service request, repair and tow times for the coming stop.
    ///
    /// Repair and tow times are only captured while the stored value is zero
    /// so the figure reported is the one at pit entry, not the countdown.
    /// Service flags are latched until the car enters the pits.
    pub fn capture_service(&mut self, service: &PitService, current_lap: i32) {
        if current_lap <= 1 {
            return;
        }

        let pit = &mut self.pit;
        if !pit.pit_repair_left.is_set() {
            pit.pit_repair_left = service.repair_left;
        }
        if !pit.pit_opt_repair_left.is_set() {
            pit.pit_opt_repair_left = service.opt_repair_left;
        }
        if !pit.tow_time.is_set() {
            pit.tow_time = service.tow_time;
        }
        if pit.phase == PitPhase::None && !pit.is_complete() {
            pit.service_flags = service.flags;
        }
    }

    /// A full pit cycle is waiting to be emitted.
    pub fn is_pit_complete(&self) -> bool {
        self.pit.is_complete()
    }

    /// Clear the pit cycle after it has been flushed.
    pub fn reset_pitstop(&mut self) {
        self.pit = PitStop::default();
    }
}
