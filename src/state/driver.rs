//! Driver change detection.

use tracing::info;

use super::SyncState;

impl SyncState {
    /// Record the name of the driver in the car.
    ///
    /// Returns `true` when it differs from the stored name. The caller decides
    /// whether a change means this client must resynchronize.
    pub fn update_driver(&mut self, name: &str) -> bool {
        if self.current_driver == name {
            return false;
        }

        info!(from = %self.current_driver, to = %name, "Driver changed");
        self.current_driver = name.to_string();
        true
    }
}
