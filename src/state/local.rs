//! Process-local state that is never synchronized.

use tracing::debug;

use super::{SessionIdentity, SessionType, derive_session_key};
use crate::messages::{EventData, RunData};
use crate::snapshot::Snapshot;

/// What this client knows about its own connection and the car right now.
#[derive(Debug, Clone, Default)]
pub struct LocalState {
    /// Telemetry is flowing
    pub connected: bool,
    /// Ticks processed since the last (re)connect
    pub tick: u64,
    /// User id of the driver in the car
    pub running_driver_id: Option<i32>,
    pub running_driver_name: String,
    pub team_id: i32,
    pub session_type: Option<SessionType>,
    /// Derived session key, `None` until the first session is seen
    pub session_key: Option<String>,
    pub(crate) last_run_data: Option<RunData>,
    pub(crate) last_event: Option<EventData>,
}

impl LocalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything on disconnect.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Take the running driver from the snapshot.
    pub fn update_running_driver(&mut self, snapshot: &Snapshot) {
        let driver = snapshot.running_driver();
        self.running_driver_id = driver.user_id;
        self.running_driver_name = driver.user_name.clone();
        self.team_id = snapshot.team_id();
    }

    /// Derive and store the session key for the given identity.
    pub fn update_session_key(&mut self, snapshot: &Snapshot, identity: SessionIdentity) -> &str {
        let inputs = snapshot.key_inputs();
        debug_assert_eq!(inputs.identity, identity);

        let session_type = inputs.session_type();
        let key = derive_session_key(&inputs);
        debug!(session_key = %key, session_type = %session_type, "Session key derived");

        self.session_type = Some(session_type);
        self.session_key.insert(key)
    }

    /// The local user is the one driving.
    pub fn is_me(&self, user_id: i32) -> bool {
        self.running_driver_id == Some(user_id)
    }

    pub fn session_key(&self) -> &str {
        self.session_key.as_deref().unwrap_or_default()
    }

    /// Forget payloads used for change detection.
    pub fn clear_emitted(&mut self) {
        self.last_run_data = None;
        self.last_event = None;
    }
}
