//! Team race state synchronizer for iRacing.
//!
//! Pitsync watches the simulator's telemetry once per tick and keeps a shared
//! picture of one car's race: session, running driver, laps, stints and pit
//! stops. The client whose user is driving publishes that picture as JSON
//! envelopes and persists it per session, so a teammate taking over the car
//! picks up exactly where the previous driver left off.
//!
//! # Architecture
//!
//! - [`source`]: where snapshots come from ([`ReplaySource`] replays a
//!   JSON-lines recording)
//! - [`snapshot`]: one frozen, validated tick of telemetry
//! - [`state`]: the synchronized state and the per-client bookkeeping, with
//!   the session, driver, pit and lap trackers
//! - [`messages`]: envelopes and payloads on the wire
//! - [`publish`]: publishers and the rejection/suppression policy
//! - [`store`]: per-session document persistence
//! - [`client`]: the tick loop tying it together
//!
//! ## Example (recording replay)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pitsync::{ClientSettings, LogPublisher, MemoryStore, ReplaySource, SyncClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> pitsync::Result<()> {
//!     let source = ReplaySource::open("spa.jsonl")?;
//!     let mut client = SyncClient::new(
//!         source,
//!         Arc::new(LogPublisher),
//!         Arc::new(MemoryStore::new()),
//!         ClientSettings::new(123456),
//!     );
//!     client.run(CancellationToken::new()).await
//! }
//! ```

pub mod client;
pub mod config;
mod error;
pub mod logging;
pub mod messages;
pub mod publish;
pub mod schema;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::*;
pub use types::*;

pub use client::{ClientSettings, SyncClient};
pub use config::{Args, Config};
pub use messages::{Envelope, MessageType, Payload};
pub use publish::{Dispatcher, HttpPublisher, LogPublisher, PublishOutcome, Publisher, Rejection};
pub use schema::{SessionInfo, SessionInfoParser};
pub use snapshot::{Snapshot, TelemetryFrame};
pub use source::{ReplaySource, SourceEvent, TelemetrySource};
pub use state::{LocalState, SyncState};
pub use store::{FileStore, MemoryStore, Store};
