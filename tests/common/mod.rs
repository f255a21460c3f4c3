//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pitsync::store::Document;
use pitsync::{
    ClientSettings, MemoryStore, PublishOutcome, Publisher, SessionInfo, SessionInfoParser, Snapshot, SourceEvent,
    Store, TelemetryFrame, TelemetrySource, TrackLocation,
};

pub const TEAM_SESSION_YAML: &str = include_str!("../fixtures/team_session.yaml");
pub const SINGLE_SESSION_YAML: &str = include_str!("../fixtures/single_session.yaml");

pub const PLAYER_CAR_IDX: usize = 2;
pub const PLAYER_USER_ID: i32 = 101;
pub const TEAMMATE_USER_ID: i32 = 202;
pub const TEAM_KEY: &str = "Night Owls@1000#2000#0";
pub const SINGLE_KEY: &str = "Alice@porsche992cup#spa#0";

/// The team session with Bob (user 202) in the player car instead of Alice.
pub fn teammate_session_yaml() -> String {
    TEAM_SESSION_YAML
        .replace("UserName: Alice", "UserName: Bob")
        .replace("UserID: 101\n   TeamID: 99", "UserID: 202\n   TeamID: 99")
}

pub fn parse(yaml: &str) -> Arc<SessionInfo> {
    Arc::new(SessionInfoParser::new().parse(yaml).unwrap())
}

pub fn frame(location: TrackLocation, seconds: f64, lap: i32) -> TelemetryFrame {
    let mut surfaces = vec![i32::from(TrackLocation::OnTrack); 4];
    surfaces[PLAYER_CAR_IDX] = i32::from(location);

    TelemetryFrame {
        session_time: seconds,
        lap_completed: lap,
        lap_last_lap_time: 138.0,
        fuel_level: 60.0,
        track_temp: 28.0,
        on_pit_road: matches!(location, TrackLocation::ApproachingPits | TrackLocation::InPitStall),
        car_idx_track_surface: surfaces,
        pit_sv_flags: 0x10,
        ..Default::default()
    }
}

pub fn snapshot(session: &Arc<SessionInfo>, location: TrackLocation, seconds: f64, lap: i32) -> Snapshot {
    Snapshot::new(frame(location, seconds, lap), Arc::clone(session)).unwrap()
}

/// Settings that keep the loop fast.
pub fn settings(user_id: i32) -> ClientSettings {
    let mut settings = ClientSettings::new(user_id);
    settings.tick_interval = Duration::from_millis(1);
    settings.fatal_pause = Duration::from_millis(10);
    settings
}

/// Plays a fixed list of events, then ends.
pub struct ScriptedSource {
    events: VecDeque<SourceEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = SourceEvent>) -> Self {
        Self { events: events.into_iter().collect() }
    }

    pub fn snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        Self::new(snapshots.into_iter().map(SourceEvent::Snapshot))
    }
}

#[async_trait::async_trait]
impl TelemetrySource for ScriptedSource {
    async fn next_event(&mut self) -> pitsync::Result<SourceEvent> {
        Ok(self.events.pop_front().unwrap_or(SourceEvent::Ended))
    }
}

/// Records every body and answers with a fixed outcome.
pub struct RecordingPublisher {
    outcome: PublishOutcome,
    bodies: Mutex<Vec<serde_json::Value>>,
}

impl RecordingPublisher {
    pub fn accepting() -> Arc<Self> {
        Self::answering(PublishOutcome::Accepted)
    }

    pub fn answering(outcome: PublishOutcome) -> Arc<Self> {
        Arc::new(Self { outcome, bodies: Mutex::new(Vec::new()) })
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn types(&self) -> Vec<String> {
        self.bodies().iter().map(|b| b["type"].as_str().unwrap().to_string()).collect()
    }

    pub fn of_type(&self, message_type: &str) -> Vec<serde_json::Value> {
        self.bodies().into_iter().filter(|b| b["type"] == message_type).collect()
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, body: &str) -> PublishOutcome {
        self.bodies.lock().unwrap().push(serde_json::from_str(body).unwrap());
        self.outcome.clone()
    }
}

/// Memory store counting document reads.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    reads: AtomicUsize,
}

impl CountingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Store for CountingStore {
    async fn get_document(&self, key: &str, name: &str) -> pitsync::Result<Option<Document>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_document(key, name).await
    }

    async fn put_document(&self, key: &str, name: &str, document: Document) -> pitsync::Result<()> {
        self.inner.put_document(key, name, document).await
    }

    async fn clear_collection(&self, key: &str) -> pitsync::Result<()> {
        self.inner.clear_collection(key).await
    }
}
