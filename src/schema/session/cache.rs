//! Session info caching and parsing
//!
//! This module provides session info caching and YAML parsing utilities with
//! support for iRacing's non-standard YAML format.

use std::sync::Arc;

use super::SessionInfo;
use crate::{Result, SyncError};
use tracing::debug;

/// Keys whose values are free text typed in by users.
const PROBLEMATIC_KEYS: &[&str] = &[
    "AbbrevName:",
    "TeamName:",
    "UserName:",
    "Initials:",
    "DriverSetupName:",
    "CarDesignStr:",
];

/// Session info cache entry with version tracking
#[derive(Debug, Clone)]
struct SessionInfoCache {
    session_info: Arc<SessionInfo>,
    version: u32,
}

/// Session info parser with YAML preprocessing and a version-keyed cache
///
/// The simulator bumps a counter (`SessionInfoUpdate`) whenever the session
/// string changes; an unchanged counter means the cached parse is still valid.
#[derive(Debug, Clone, Default)]
pub struct SessionInfoParser {
    cache: Option<SessionInfoCache>,
}

impl SessionInfoParser {
    /// Create new session info parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse session info for a given update counter, reusing the cached
    /// result when the counter has not moved.
    pub fn parse_versioned(&mut self, yaml: &str, version: u32) -> Result<Arc<SessionInfo>> {
        if let Some(cached) = self.cache.as_ref().filter(|c| c.version == version) {
            debug!(version, "Using cached session info");
            return Ok(Arc::clone(&cached.session_info));
        }

        debug!(version, bytes = yaml.len(), "Parsing session info");
        let session_info = Arc::new(self.parse(yaml)?);
        self.cache = Some(SessionInfoCache { session_info: Arc::clone(&session_info), version });
        Ok(session_info)
    }

    /// Cached session info for a version, if any.
    pub fn get_cached(&self, version: u32) -> Option<Arc<SessionInfo>> {
        self.cache
            .as_ref()
            .filter(|cache| cache.version == version)
            .map(|cache| Arc::clone(&cache.session_info))
    }

    /// Drop the cached session info (used on disconnect).
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Preprocess iRacing YAML to fix compatibility issues with unescaped characters
    /// Based on iRacing forum discussion: <https://forums.iracing.com/discussion/comment/374646#Comment_374646>
    pub fn preprocess_iracing_yaml(&self, yaml: &str) -> Result<String> {
        if yaml.trim().is_empty() {
            return Err(SyncError::parse("Session YAML preprocessing", "YAML string is empty"));
        }

        // Control characters other than basic whitespace break the parser
        let cleaned: String = yaml
            .chars()
            .filter(|ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
            .collect();

        let lines = cleaned.lines().map(|line| {
            let Some((key, pos)) =
                PROBLEMATIC_KEYS.iter().find_map(|key| line.find(key).map(|pos| (*key, pos)))
            else {
                return line.to_string();
            };

            let after_colon = pos + key.len();
            let value = line[after_colon..].trim();
            if value.is_empty() || value.starts_with('\'') {
                return line.to_string();
            }

            format!("{} '{}'", &line[..after_colon], value.replace('\'', "''"))
        });

        Ok(lines.collect::<Vec<_>>().join("\n"))
    }

    /// Parse YAML to SessionInfo struct (with automatic preprocessing)
    pub fn parse(&self, yaml: &str) -> Result<SessionInfo> {
        let preprocessed = self.preprocess_iracing_yaml(yaml)?;
        let session_info = SessionInfo::parse(&preprocessed)?;
        self.validate_session_info(&session_info)?;
        Ok(session_info)
    }

    /// Validate the fields the synchronizer cannot work without
    pub fn validate_session_info(&self, session_info: &SessionInfo) -> Result<()> {
        if session_info.weekend_info.track_name.is_empty() {
            return Err(SyncError::parse("Session validation", "Missing track name"));
        }

        if session_info.session_info.sessions.is_empty() {
            return Err(SyncError::parse("Session validation", "No sessions found"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "WeekendInfo:\n TrackName: monza full\nSessionInfo:\n Sessions:\n - SessionNum: 0\n   SessionType: Practice\nDriverInfo:\n DriverCarIdx: 0\n Drivers:\n - CarIdx: 0\n   UserName: O'Connor, Mike\n   TeamName: \"Fast & Furious\" Racing\n";

    #[test]
    fn quotes_user_typed_values() {
        let parser = SessionInfoParser::new();
        let cleaned = parser.preprocess_iracing_yaml(RAW).unwrap();
        assert!(cleaned.contains("UserName: 'O''Connor, Mike'"));
        assert!(cleaned.contains("TeamName: '\"Fast & Furious\" Racing'"));
    }

    #[test]
    fn strips_control_characters() {
        let parser = SessionInfoParser::new();
        let cleaned = parser.preprocess_iracing_yaml("WeekendInfo:\n TrackName: mon\u{1}za\n").unwrap();
        assert!(cleaned.contains("TrackName: monza"));
    }

    #[test]
    fn parses_names_that_break_plain_yaml() {
        let parser = SessionInfoParser::new();
        let info = parser.parse(RAW).unwrap();
        let driver = info.driver_info.unwrap().driver_for_car(0).cloned().unwrap();
        assert_eq!(driver.user_name, "O'Connor, Mike");
        assert_eq!(driver.team_name.as_deref(), Some("\"Fast & Furious\" Racing"));
    }

    #[test]
    fn cache_is_keyed_by_version() {
        let mut parser = SessionInfoParser::new();
        let first = parser.parse_versioned(RAW, 3).unwrap();
        // Same version: cached, even if the text differs
        let again = parser.parse_versioned("garbage", 3).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(parser.get_cached(4).is_none());

        parser.clear_cache();
        assert!(parser.get_cached(3).is_none());
    }

    #[test]
    fn rejects_session_without_sessions() {
        let parser = SessionInfoParser::new();
        let err = parser.parse("WeekendInfo:\n TrackName: monza full\n").unwrap_err();
        assert!(err.to_string().contains("No sessions found"));
    }

    #[test]
    fn rejects_empty_input() {
        let parser = SessionInfoParser::new();
        assert!(parser.preprocess_iracing_yaml("  \n").is_err());
    }
}
