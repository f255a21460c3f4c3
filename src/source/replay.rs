//! Replay source for recorded telemetry
//!
//! A recording is a JSON-lines file, one tick per line:
//!
//! ```json
//! {"sessionVersion": 1, "sessionYaml": "---\nWeekendInfo: ...", "frame": {"SessionTime": 12.0, ...}}
//! {"frame": {"SessionTime": 12.5, ...}}
//! {"connected": false}
//! ```
//!
//! Every key is optional. A line carrying a session string makes it current
//! for the following frames; `connected: false` marks the simulator going
//! away. Blank lines are skipped.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{SourceEvent, TelemetrySource};
use crate::schema::{SessionInfo, SessionInfoParser};
use crate::snapshot::{Snapshot, TelemetryFrame};
use crate::{Result, SyncError};

/// One line of a recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RecordedTick {
    pub connected: Option<bool>,
    /// Session string update counter
    pub session_version: Option<u32>,
    pub session_yaml: Option<String>,
    pub frame: Option<TelemetryFrame>,
}

/// Replays a recording as fast as the sync loop polls it.
#[derive(Debug)]
pub struct ReplaySource {
    lines: Vec<String>,
    position: usize,
    parser: SessionInfoParser,
    session: Option<Arc<SessionInfo>>,
    session_version: u32,
    connected: bool,
}

impl ReplaySource {
    /// Open a recording file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SyncError::file_error(path, e))?;
        let source = Self::from_recording(&content);
        info!(path = %path.display(), ticks = source.lines.len(), "Opened telemetry recording");
        Ok(source)
    }

    /// Replay an in-memory recording.
    pub fn from_recording(content: &str) -> Self {
        Self {
            lines: content.lines().filter(|l| !l.trim().is_empty()).map(str::to_string).collect(),
            position: 0,
            parser: SessionInfoParser::new(),
            session: None,
            session_version: 0,
            connected: false,
        }
    }

    /// Lines not yet replayed.
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.position)
    }

    fn apply_session(&mut self, tick: &RecordedTick) -> Result<()> {
        match (&tick.session_yaml, tick.session_version) {
            (Some(yaml), version) => {
                let version = version.unwrap_or(self.session_version + 1);
                self.session = Some(self.parser.parse_versioned(yaml, version)?);
                self.session_version = version;
            }
            (None, Some(version)) if version != self.session_version => {
                let cached = self.parser.get_cached(version).ok_or_else(|| {
                    SyncError::parse("Recording", format!("Session version {version} without session string"))
                })?;
                self.session = Some(cached);
                self.session_version = version;
            }
            (None, _) => {}
        }
        Ok(())
    }

    fn disconnect(&mut self) -> bool {
        self.session = None;
        self.parser.clear_cache();
        std::mem::replace(&mut self.connected, false)
    }
}

#[async_trait::async_trait]
impl TelemetrySource for ReplaySource {
    async fn next_event(&mut self) -> Result<SourceEvent> {
        while self.position < self.lines.len() {
            let line_no = self.position + 1;
            let line = &self.lines[self.position];
            self.position += 1;

            let tick: RecordedTick = serde_json::from_str(line)
                .map_err(|e| SyncError::parse(format!("Recording line {line_no}"), e.to_string()))?;

            if tick.connected == Some(false) {
                if self.disconnect() {
                    debug!(line_no, "Recording marks disconnect");
                    return Ok(SourceEvent::Disconnected);
                }
                continue;
            }

            self.apply_session(&tick)?;

            let Some(frame) = tick.frame else {
                trace!(line_no, "Recording line without frame");
                continue;
            };

            let session = self.session.clone().ok_or_else(|| {
                SyncError::parse(format!("Recording line {line_no}"), "Frame before any session string")
            })?;

            let snapshot = Snapshot::new(frame, session)?;
            self.connected = true;
            return Ok(SourceEvent::Snapshot(snapshot));
        }

        debug!("Reached end of recording");
        Ok(SourceEvent::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEAM_SESSION_YAML, frame_at};
    use crate::types::TrackLocation;
    use std::io::Write;

    fn line(tick: &RecordedTick) -> String {
        serde_json::to_string(tick).unwrap()
    }

    fn frame_line(seconds: f64) -> String {
        line(&RecordedTick { frame: Some(frame_at(TrackLocation::OnTrack, seconds, 2)), ..Default::default() })
    }

    fn session_line(seconds: f64) -> String {
        line(&RecordedTick {
            session_version: Some(1),
            session_yaml: Some(TEAM_SESSION_YAML.to_string()),
            frame: Some(frame_at(TrackLocation::OnTrack, seconds, 2)),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn replays_frames_then_ends() {
        let recording = [session_line(1.0), frame_line(1.5), String::new(), frame_line(2.0)].join("\n");
        let mut source = ReplaySource::from_recording(&recording);
        assert_eq!(source.remaining(), 3);

        let mut times = Vec::new();
        while let SourceEvent::Snapshot(snapshot) = source.next_event().await.unwrap() {
            times.push(snapshot.frame().session_time);
            assert_eq!(snapshot.track_name(), "spa");
        }
        assert_eq!(times, vec![1.0, 1.5, 2.0]);
        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Ended));
    }

    #[tokio::test]
    async fn disconnect_drops_session() {
        let disconnect = line(&RecordedTick { connected: Some(false), ..Default::default() });
        let recording = [session_line(1.0), disconnect.clone(), disconnect, frame_line(2.0)].join("\n");
        let mut source = ReplaySource::from_recording(&recording);

        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Snapshot(_)));
        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Disconnected));
        // second disconnect is swallowed; the frame has no session string any more
        let err = source.next_event().await.unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[tokio::test]
    async fn bad_line_is_an_error_and_replay_continues() {
        let recording = [session_line(1.0), "{ nope".to_string(), frame_line(2.0)].join("\n");
        let mut source = ReplaySource::from_recording(&recording);

        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Snapshot(_)));
        assert!(matches!(source.next_event().await.unwrap_err(), SyncError::Parse { .. }));
        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Snapshot(_)));
    }

    #[tokio::test]
    async fn opens_recording_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", session_line(3.0)).unwrap();
        file.flush().unwrap();

        let mut source = ReplaySource::open(file.path()).unwrap();
        assert!(matches!(source.next_event().await.unwrap(), SourceEvent::Snapshot(_)));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = ReplaySource::open("/nonexistent/recording.jsonl").unwrap_err();
        assert!(matches!(err, SyncError::File { .. }));
    }
}
