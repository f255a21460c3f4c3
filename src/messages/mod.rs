//! Outbound message family.
//!
//! Every message is an [`Envelope`] routing one [`Payload`] to a session:
//!
//! ```json
//! {
//!   "type": "lapdata",
//!   "version": "1.0",
//!   "sessionId": "Night Owls@1000#2000#0",
//!   "teamId": "99",
//!   "clientId": "pitwall-laptop",
//!   "payload": { "lap": 12, "stintLap": 4, ... }
//! }
//! ```
//!
//! Timestamps and durations inside payloads are [`DayTime`](crate::types::DayTime)
//! values (fractions of a day); unlimited lap or time limits are `null`.

mod payloads;

use std::fmt;

use serde::Serialize;

use crate::Result;

pub use payloads::{EventData, LapData, PitstopData, RunData, SessionInfoPayload, SyncData};

/// Protocol version the sink checks against.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Kind of an outbound message, serialized as the envelope `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    #[serde(rename = "sessionInfo")]
    SessionInfo,
    #[serde(rename = "lapdata")]
    LapData,
    #[serde(rename = "pitstop")]
    Pitstop,
    #[serde(rename = "runData")]
    RunData,
    #[serde(rename = "event")]
    Event,
    #[serde(rename = "syncData")]
    SyncData,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::SessionInfo => "sessionInfo",
            MessageType::LapData => "lapdata",
            MessageType::Pitstop => "pitstop",
            MessageType::RunData => "runData",
            MessageType::Event => "event",
            MessageType::SyncData => "syncData",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    SessionInfo(SessionInfoPayload),
    LapData(LapData),
    Pitstop(PitstopData),
    RunData(RunData),
    Event(EventData),
    SyncData(SyncData),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::SessionInfo(_) => MessageType::SessionInfo,
            Payload::LapData(_) => MessageType::LapData,
            Payload::Pitstop(_) => MessageType::Pitstop,
            Payload::RunData(_) => MessageType::RunData,
            Payload::Event(_) => MessageType::Event,
            Payload::SyncData(_) => MessageType::SyncData,
        }
    }
}

macro_rules! impl_into_payload {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Payload {
            fn from(value: $ty) -> Self {
                Payload::$variant(value)
            }
        })*
    };
}

impl_into_payload!(
    SessionInfo(SessionInfoPayload),
    LapData(LapData),
    Pitstop(PitstopData),
    RunData(RunData),
    Event(EventData),
    SyncData(SyncData),
);

/// Where a message belongs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routing {
    pub session_key: String,
    pub team_id: String,
    pub client_id: String,
}

/// A routed, versioned message ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub version: &'static str,
    pub session_id: String,
    pub team_id: String,
    pub client_id: String,
    pub payload: Payload,
}

impl Envelope {
    pub fn new(routing: &Routing, payload: impl Into<Payload>) -> Self {
        let payload = payload.into();
        Self {
            message_type: payload.message_type(),
            version: PROTOCOL_VERSION,
            session_id: routing.session_key.clone(),
            team_id: routing.team_id.clone(),
            client_id: routing.client_id.clone(),
            payload,
        }
    }

    /// Serialize to the JSON body sent to the sink.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
