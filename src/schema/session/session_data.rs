//! Session list and per-session limits

use serde::{Deserialize, Serialize};

use crate::types::DayTime;

/// Value the simulator uses for sessions without a lap or time limit.
const UNLIMITED: &str = "unlimited";

/// Session information data from iRacing
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfoData {
    /// Current session number
    pub current_session_num: i32,
    /// List of sessions
    pub sessions: Vec<Session>,
}

impl SessionInfoData {
    /// Look up a session by its `SessionNum`.
    pub fn session(&self, session_num: i32) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_num == session_num)
    }
}

/// Individual session data
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Session {
    /// Session number
    pub session_num: i32,
    /// Session laps ("unlimited" or number)
    pub session_laps: String,
    /// Session time ("unlimited" or "<seconds> sec")
    pub session_time: String,
    /// Session type (Practice, Qualify, Race, ...)
    pub session_type: String,
    /// Session name
    pub session_name: Option<String>,
}

impl Session {
    /// Lap limit, `None` when unlimited or unparseable.
    pub fn lap_limit(&self) -> Option<u32> {
        let laps = self.session_laps.trim();
        if laps.eq_ignore_ascii_case(UNLIMITED) {
            return None;
        }
        laps.parse().ok()
    }

    /// Time limit, `None` when unlimited or unparseable.
    pub fn time_limit(&self) -> Option<DayTime> {
        let time = self.session_time.trim();
        if time.eq_ignore_ascii_case(UNLIMITED) {
            return None;
        }
        let seconds = time.strip_suffix("sec").unwrap_or(time).trim();
        seconds.parse::<f64>().ok().map(DayTime::from_seconds)
    }
}
