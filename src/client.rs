//! The tick loop.
//!
//! [`SyncClient`] owns the telemetry source, the synchronized and local state
//! and the collaborators. Each tick runs the trackers in a fixed order on one
//! frozen snapshot:
//!
//! 1. session identity (key derivation, `sessionInfo`, clear or resync)
//! 2. driver (resync when the local user takes over the car)
//! 3. pit phase (`pitstop` once per completed cycle)
//! 4. laps (`lapdata`)
//! 5. `runData`, `event`, and the periodic `syncData`
//!
//! Only the client whose user is driving publishes car messages and writes the
//! `State` document; every client publishes `sessionInfo`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::messages::{
    Envelope, EventData, LapData, Payload, PitstopData, RunData, Routing, SessionInfoPayload, SyncData,
};
use crate::publish::{Dispatcher, Publisher};
use crate::snapshot::Snapshot;
use crate::source::{SourceEvent, TelemetrySource};
use crate::state::{LocalState, SessionType, SyncState};
use crate::store::{Document, INFO_DOCUMENT, STATE_DOCUMENT, Store};
use crate::{Result, SyncError};

/// Consecutive source errors after which the loop gives up.
pub const MAX_SOURCE_ERRORS: u32 = 10;

/// Cancel `cancel` once `signal` resolves successfully.
///
/// When the signal handler cannot be installed the token is left alone so
/// the loop keeps running; it can still end with its source.
pub async fn cancel_on_signal<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Interrupt received, shutting down");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "Unable to listen for interrupts, Ctrl-C will not stop the loop cleanly"),
    }
}

/// Tuning of the tick loop.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// User id of the local user
    pub user_id: i32,
    /// Identifies this client in every envelope
    pub client_id: String,
    pub tick_interval: Duration,
    pub publish_timeout: Duration,
    pub store_timeout: Duration,
    /// `syncData` is sent every this many ticks
    pub sync_interval_ticks: u64,
    /// Pause before returning a fatal error
    pub fatal_pause: Duration,
}

impl ClientSettings {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            client_id: user_id.to_string(),
            tick_interval: Duration::from_millis(500),
            publish_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(5),
            sync_interval_ticks: 10,
            fatal_pause: Duration::from_secs(2),
        }
    }
}

/// Synchronizes one car's race state with the team.
pub struct SyncClient<S> {
    source: S,
    dispatcher: Dispatcher,
    store: Arc<dyn Store>,
    settings: ClientSettings,
    sync: SyncState,
    local: LocalState,
}

impl<S: TelemetrySource> SyncClient<S> {
    pub fn new(source: S, publisher: Arc<dyn Publisher>, store: Arc<dyn Store>, settings: ClientSettings) -> Self {
        let dispatcher = Dispatcher::new(publisher, settings.publish_timeout);
        Self { source, dispatcher, store, settings, sync: SyncState::new(), local: LocalState::new() }
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    pub fn local_state(&self) -> &LocalState {
        &self.local
    }

    /// Publishing was switched off after repeated validation rejections.
    pub fn publishing_suppressed(&self) -> bool {
        self.dispatcher.is_suppressed()
    }

    /// Run until the source ends, `cancel` fires or a fatal error occurs.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(user_id = self.settings.user_id, client_id = %self.settings.client_id, "Sync loop started");
        let mut error_count = 0u32;

        loop {
            if cancel.is_cancelled() {
                info!("Sync loop cancelled");
                break;
            }

            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Sync loop cancelled while polling");
                    break;
                }
                event = self.source.next_event() => event,
            };

            match event {
                Ok(SourceEvent::Snapshot(snapshot)) => {
                    error_count = 0;
                    self.on_connected();
                    if let Err(e) = self.process(&snapshot).await {
                        if e.is_fatal() {
                            error!(error = %e, "Fatal rejection, stopping");
                            tokio::time::sleep(self.settings.fatal_pause).await;
                            return Err(e);
                        }
                        warn!(error = %e, "Tick failed");
                    }
                }
                Ok(SourceEvent::Disconnected) => {
                    error_count = 0;
                    self.on_disconnected();
                }
                Ok(SourceEvent::Ended) => {
                    info!(ticks = self.local.tick, "Telemetry source ended");
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Source error ({}/{}): {}", error_count, MAX_SOURCE_ERRORS, e);
                    if error_count >= MAX_SOURCE_ERRORS {
                        error!("Too many source errors, shutting down");
                        return Err(e);
                    }

                    // 50ms, 100ms, 200ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Sync loop cancelled while sleeping");
                    break;
                }
                _ = tokio::time::sleep(self.settings.tick_interval) => {}
            }
        }

        info!(ticks = self.local.tick, "Sync loop ended");
        Ok(())
    }

    fn on_connected(&mut self) {
        if !self.local.connected {
            info!("Telemetry connected");
            self.local.connected = true;
        }
    }

    fn on_disconnected(&mut self) {
        if self.local.connected {
            info!("Telemetry disconnected");
        }
        self.local.reset();
    }

    /// Run every tracker on one snapshot.
    ///
    /// Only fatal rejections are returned; transient failures are logged.
    pub async fn process(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.local.tick += 1;

        let session_changed = self.sync.update_session(snapshot.session_identity());
        if session_changed || self.local.session_key.is_none() {
            self.local.update_running_driver(snapshot);
            self.local.update_session_key(snapshot, self.sync.session_identity());
        }
        if session_changed {
            self.on_session_change(snapshot).await?;
        }

        if self.sync.update_driver(&snapshot.running_driver().user_name) {
            self.local.update_running_driver(snapshot);
            if !session_changed && self.is_me() {
                self.resync().await;
            }
        }

        self.track_pits(snapshot).await?;
        self.track_laps(snapshot).await?;

        if self.is_me() {
            self.emit_run_data(snapshot).await?;
            self.emit_event(snapshot).await?;
            if self.settings.sync_interval_ticks > 0 && self.local.tick % self.settings.sync_interval_ticks == 0 {
                self.emit(SyncData::compose(&self.sync, snapshot)).await?;
            }
        }

        Ok(())
    }

    async fn on_session_change(&mut self, snapshot: &Snapshot) -> Result<()> {
        let key = self.local.session_key().to_string();
        let session_type = self.local.session_type.unwrap_or(SessionType::Single);
        let weekend = &snapshot.session_info().weekend_info;
        info!(
            session_key = %key,
            %session_type,
            track = %weekend.track_display_name,
            team_event = weekend.is_team_event(),
            "New session"
        );

        self.sync.reset_progress();
        self.local.clear_emitted();

        match session_type {
            SessionType::Single => {
                let store = Arc::clone(&self.store);
                if let Err(e) = self.bounded("clear collection", store.clear_collection(&key)).await {
                    warn!(session_key = %key, error = %e, "Unable to clear previous session data");
                }
            }
            SessionType::Team => self.resync().await,
        }

        let info = SessionInfoPayload::from_snapshot(&key, snapshot);
        match serde_json::to_value(&info) {
            Ok(document) => self.persist(INFO_DOCUMENT, document).await,
            Err(e) => warn!(session_key = %key, error = %e, "Unable to serialize session info"),
        }
        self.emit(info).await
    }

    async fn track_pits(&mut self, snapshot: &Snapshot) -> Result<()> {
        let lap = snapshot.lap_completed();
        self.sync.capture_service(&snapshot.pit_service(), lap);

        if let Some(phase) = self.sync.update_pits(snapshot.car_track_location(), snapshot.session_time(), lap) {
            info!(?phase, session_time = snapshot.session_time().seconds(), "Pit phase changed");
            if self.is_me() && !self.sync.is_pit_complete() {
                self.persist_state().await;
            }
        }

        if self.sync.is_pit_complete() {
            if self.is_me() {
                let stop = PitstopData::from_state(&self.sync);
                info!(
                    stint = stop.stint,
                    lane_seconds = self.sync.pit().lane_time().seconds(),
                    "Pit stop completed"
                );
                self.emit(stop).await?;
            } else {
                debug!(driver = %self.sync.current_driver(), "Pit stop completed by another driver");
            }
            self.sync.reset_pitstop();
            if self.is_me() {
                self.persist_state().await;
            }
        }
        Ok(())
    }

    async fn track_laps(&mut self, snapshot: &Snapshot) -> Result<()> {
        if !self.sync.update_lap(snapshot.lap_completed(), snapshot.last_lap_time()) || !self.is_me() {
            return Ok(());
        }

        info!(
            lap = self.sync.lap(),
            stint = self.sync.stint_count(),
            stint_lap = self.sync.stint_lap(),
            "Lap completed"
        );
        self.emit(LapData::compose(&self.sync, snapshot)).await?;
        self.persist_state().await;
        Ok(())
    }

    async fn emit_run_data(&mut self, snapshot: &Snapshot) -> Result<()> {
        let run = RunData::from_snapshot(snapshot);
        if run.is_empty_tank() {
            trace!("Fuel reads zero, runData suppressed");
            return Ok(());
        }
        if self.local.last_run_data.as_ref().is_some_and(|last| !run.changed_since(last)) {
            return Ok(());
        }

        self.local.last_run_data = Some(run.clone());
        self.emit(run).await
    }

    async fn emit_event(&mut self, snapshot: &Snapshot) -> Result<()> {
        let event = EventData::from_snapshot(snapshot);
        let Some(last) = self.local.last_event.as_ref() else {
            self.local.last_event = Some(event);
            return Ok(());
        };
        if !event.changed_since(last) {
            return Ok(());
        }

        self.local.last_event = Some(event.clone());
        self.emit(event).await
    }

    async fn emit(&mut self, payload: impl Into<Payload>) -> Result<()> {
        let routing = Routing {
            session_key: self.local.session_key().to_string(),
            team_id: self.local.team_id.to_string(),
            client_id: self.settings.client_id.clone(),
        };
        let envelope = Envelope::new(&routing, payload);
        self.dispatcher.dispatch(&envelope).await.map(|_| ())
    }

    /// Adopt the persisted `State` document of the current session, if any.
    async fn resync(&mut self) {
        let key = self.local.session_key().to_string();
        let store = Arc::clone(&self.store);
        let document = match self.bounded("load state", store.get_document(&key, STATE_DOCUMENT)).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(session_key = %key, "No persisted state to resync from");
                return;
            }
            Err(e) => {
                warn!(session_key = %key, error = %e, "Unable to load persisted state");
                return;
            }
        };

        match serde_json::from_value::<SyncState>(document) {
            Ok(persisted) => {
                info!(
                    session_key = %key,
                    lap = persisted.lap(),
                    stint = persisted.stint_count(),
                    pit_phase = ?persisted.pit_phase(),
                    "Resynchronized from persisted state"
                );
                self.sync.resync_from(persisted);
            }
            Err(e) => warn!(session_key = %key, error = %e, "Ignoring unreadable persisted state"),
        }
    }

    async fn persist_state(&self) {
        match serde_json::to_value(&self.sync) {
            Ok(document) => self.persist(STATE_DOCUMENT, document).await,
            Err(e) => warn!(session_key = %self.local.session_key(), error = %e, "Unable to serialize state"),
        }
    }

    async fn persist(&self, name: &str, document: Document) {
        let key = self.local.session_key();
        let store = Arc::clone(&self.store);
        if let Err(e) = self.bounded("persist", store.put_document(key, name, document)).await {
            warn!(session_key = %key, document = name, error = %e, "Unable to write document");
        }
    }

    /// Bound a store call by the configured timeout.
    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        let duration = self.settings.store_timeout;
        tokio::time::timeout(duration, call)
            .await
            .map_err(|_| SyncError::Timeout { operation: operation.to_string(), duration })?
    }

    fn is_me(&self) -> bool {
        self.local.is_me(self.settings.user_id)
    }
}
