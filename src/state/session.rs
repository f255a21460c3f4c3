//! Session identity, classification and key derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::SyncState;

/// The triple that identifies one session of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SessionIdentity {
    pub session_id: i32,
    pub sub_session_id: i32,
    pub session_num: i32,
}

impl SessionIdentity {
    /// Identity before any telemetry has been seen.
    pub const UNKNOWN: SessionIdentity =
        SessionIdentity { session_id: -1, sub_session_id: -1, session_num: -1 };

    pub fn new(session_id: i32, sub_session_id: i32, session_num: i32) -> Self {
        Self { session_id, sub_session_id, session_num }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}#{}", self.session_id, self.sub_session_id, self.session_num)
    }
}

/// Whether a session is shared by a team or driven alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Single,
    Team,
}

impl SessionType {
    /// Offline sessions report session id 0; solo entries report team id 0.
    pub fn classify(session_id: i32, team_id: i32) -> Self {
        if session_id == 0 || team_id == 0 { SessionType::Single } else { SessionType::Team }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Single => "single",
            SessionType::Team => "team",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the session key is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeyInputs<'a> {
    pub identity: SessionIdentity,
    pub team_id: i32,
    pub team_name: &'a str,
    pub car_path: &'a str,
    pub track_name: &'a str,
}

impl SessionKeyInputs<'_> {
    pub fn session_type(&self) -> SessionType {
        SessionType::classify(self.identity.session_id, self.team_id)
    }
}

/// Derive the stable key naming a session's document collection.
///
/// Single sessions have no server-side identity worth sharing, so the key is
/// built from what the driver chose: `teamName@carPath#trackName#sessionNum`.
/// Team sessions use `teamName@sessionId#subSessionId#sessionNum`, which every
/// team member derives identically.
///
/// ```rust
/// use pitsync::state::{SessionIdentity, SessionKeyInputs, derive_session_key};
///
/// let inputs = SessionKeyInputs {
///     identity: SessionIdentity::new(1000, 2000, 2),
///     team_id: 77,
///     team_name: "Night Owls",
///     car_path: "porsche992cup",
///     track_name: "spa",
/// };
/// assert_eq!(derive_session_key(&inputs), "Night Owls@1000#2000#2");
/// ```
pub fn derive_session_key(inputs: &SessionKeyInputs<'_>) -> String {
    let id = &inputs.identity;
    match inputs.session_type() {
        SessionType::Single => {
            format!("{}@{}#{}#{}", inputs.team_name, inputs.car_path, inputs.track_name, id.session_num)
        }
        SessionType::Team => {
            format!("{}@{}#{}#{}", inputs.team_name, id.session_id, id.sub_session_id, id.session_num)
        }
    }
}

impl SyncState {
    /// Record the session identity from telemetry.
    ///
    /// Returns `true` when any of the three ids differs from the stored ones.
    pub fn update_session(&mut self, identity: SessionIdentity) -> bool {
        if self.session == identity {
            return false;
        }

        info!(from = %self.session, to = %identity, "Session identity changed");
        self.session = identity;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(session_id: i32, team_id: i32) -> SessionKeyInputs<'static> {
        SessionKeyInputs {
            identity: SessionIdentity::new(session_id, 2000, 1),
            team_id,
            team_name: "Night Owls",
            car_path: "ferrari296gt3",
            track_name: "nurburgring",
        }
    }

    #[test]
    fn first_identity_is_a_change() {
        let mut state = SyncState::new();
        assert!(state.update_session(SessionIdentity::new(1000, 2000, 0)));
        assert!(!state.update_session(SessionIdentity::new(1000, 2000, 0)));
    }

    #[test]
    fn any_component_change_is_detected() {
        let mut state = SyncState::new();
        state.update_session(SessionIdentity::new(1000, 2000, 0));

        assert!(state.update_session(SessionIdentity::new(1000, 2000, 1)));
        assert!(state.update_session(SessionIdentity::new(1000, 2001, 1)));
        assert!(state.update_session(SessionIdentity::new(1001, 2001, 1)));
        assert_eq!(state.session_identity(), SessionIdentity::new(1001, 2001, 1));
    }

    #[test]
    fn offline_session_is_single() {
        assert_eq!(inputs(0, 77).session_type(), SessionType::Single);
        assert_eq!(derive_session_key(&inputs(0, 77)), "Night Owls@ferrari296gt3#nurburgring#1");
    }

    #[test]
    fn solo_entry_is_single() {
        assert_eq!(inputs(1000, 0).session_type(), SessionType::Single);
        assert_eq!(derive_session_key(&inputs(1000, 0)), "Night Owls@ferrari296gt3#nurburgring#1");
    }

    #[test]
    fn team_entry_uses_server_ids() {
        assert_eq!(inputs(1000, 77).session_type(), SessionType::Team);
        assert_eq!(derive_session_key(&inputs(1000, 77)), "Night Owls@1000#2000#1");
    }

    #[test]
    fn session_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SessionType::Team).unwrap(), "\"team\"");
        assert_eq!(SessionType::Single.to_string(), "single");
    }

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn key_derivation_is_pure(
            session_id in 0i32..100_000,
            sub_session_id in 0i32..100_000,
            session_num in 0i32..8,
            team_id in 0i32..1_000,
            team_name in "[A-Za-z ]{1,16}",
            car_path in "[a-z0-9]{1,12}",
            track_name in "[a-z_]{1,12}",
          ) {
            let inputs = SessionKeyInputs {
              identity: SessionIdentity::new(session_id, sub_session_id, session_num),
              team_id,
              team_name: &team_name,
              car_path: &car_path,
              track_name: &track_name,
            };
            let key = derive_session_key(&inputs);
            prop_assert_eq!(&key, &derive_session_key(&inputs.clone()));
            let prefix = format!("{}@", team_name);
            let suffix = format!("#{}", session_num);
            prop_assert!(key.starts_with(&prefix));
            prop_assert!(key.ends_with(&suffix));
            if session_id == 0 || team_id == 0 {
              prop_assert!(key.contains(&car_path));
            } else {
              let ids = format!("@{session_id}#{sub_session_id}#");
              prop_assert!(key.contains(&ids));
            }
          }
        }
    }
}
