//! Event and track block of the session string

use serde::{Deserialize, Serialize};

/// The `WeekendInfo` block: which event this is and where it runs.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendInfo {
    /// Internal track name, stable across releases; part of single-session keys
    pub track_name: String,
    pub track_display_name: String,
    /// 0 or absent offline
    #[serde(rename = "SessionID")]
    pub session_id: Option<i32>,
    #[serde(rename = "SubSessionID")]
    pub sub_session_id: Option<i32>,
    /// 1 when the event is a team event
    pub team_racing: Option<i32>,
}

impl WeekendInfo {
    /// Session and sub-session ids, 0 when the simulator leaves them out.
    pub fn session_ids(&self) -> (i32, i32) {
        (self.session_id.unwrap_or(0), self.sub_session_id.unwrap_or(0))
    }

    pub fn is_team_event(&self) -> bool {
        self.team_racing.is_some_and(|flag| flag != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_read_as_offline() {
        let weekend: WeekendInfo = serde_yaml_ng::from_str("TrackName: spa\n").unwrap();
        assert_eq!(weekend.session_ids(), (0, 0));
        assert!(!weekend.is_team_event());
    }

    #[test]
    fn reads_ids_and_team_flag() {
        let weekend: WeekendInfo =
            serde_yaml_ng::from_str("TrackName: spa\nSessionID: 1000\nSubSessionID: 2000\nTeamRacing: 1\n").unwrap();
        assert_eq!(weekend.session_ids(), (1000, 2000));
        assert!(weekend.is_team_event());
    }
}
