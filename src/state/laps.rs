//! Lap and stint counting.

use tracing::debug;

use super::SyncState;
use crate::types::DayTime;

impl SyncState {
    /// Record the completed-lap counter.
    ///
    /// Returns `true` when the lap number changed. The stint lap advances by
    /// the same delta. The very first lap seen opens stint 1 with the stint
    /// lap seeded to the current lap, so joining a session late still counts
    /// the laps already driven.
    pub fn update_lap(&mut self, lap: i32, lap_time: DayTime) -> bool {
        if lap == self.lap {
            return false;
        }

        let delta = lap - self.lap;
        self.lap = lap;
        self.last_lap_time = lap_time;
        self.stint_lap = (self.stint_lap + delta).max(0);

        if self.stint_count == 0 {
            self.stint_count = 1;
            self.stint_lap = lap.max(0);
        }

        debug!(lap, stint = self.stint_count, stint_lap = self.stint_lap, "Lap counter advanced");
        true
    }
}
