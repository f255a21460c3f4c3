//! Per-car track surface as reported in `CarIdxTrackSurface`

use serde::{Deserialize, Serialize};

/// Where a car is on the track (`irsdk_TrkLoc`).
///
/// Serialized as the simulator's integer code so persisted state and
/// recordings stay readable by other tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum TrackLocation {
    /// Car is not in the world (in the garage, spectating, loading)
    #[default]
    NotInWorld,
    OffTrack,
    InPitStall,
    /// Pit lane, including the pit entry and exit road
    ApproachingPits,
    OnTrack,
}

impl TrackLocation {
    /// Whether this location carries information the pit state machine can use.
    pub fn is_known(self) -> bool {
        self != TrackLocation::NotInWorld
    }

    /// Event name used in outbound payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackLocation::NotInWorld => "OffWorld",
            TrackLocation::OffTrack => "OffTrack",
            TrackLocation::InPitStall => "InPitStall",
            TrackLocation::ApproachingPits => "ApproachingPits",
            TrackLocation::OnTrack => "OnTrack",
        }
    }
}

impl From<i32> for TrackLocation {
    /// Unknown codes map to `NotInWorld`, which the trackers ignore.
    fn from(value: i32) -> Self {
        match value {
            0 => TrackLocation::OffTrack,
            1 => TrackLocation::InPitStall,
            2 => TrackLocation::ApproachingPits,
            3 => TrackLocation::OnTrack,
            _ => TrackLocation::NotInWorld,
        }
    }
}

impl From<TrackLocation> for i32 {
    fn from(value: TrackLocation) -> Self {
        match value {
            TrackLocation::NotInWorld => -1,
            TrackLocation::OffTrack => 0,
            TrackLocation::InPitStall => 1,
            TrackLocation::ApproachingPits => 2,
            TrackLocation::OnTrack => 3,
        }
    }
}
