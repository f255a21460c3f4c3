//! Outbound transport.
//!
//! A [`Publisher`] delivers one serialized envelope and reports what the sink
//! said about it. It never retries and never fails with an error: every
//! outcome, including transport failures, is a [`PublishOutcome`] so the
//! failure policy lives in one place, the [`Dispatcher`]:
//!
//! | Outcome | Policy |
//! |---|---|
//! | accepted | reset the validation-rejection counter |
//! | authorization / protocol-version rejection | fatal, returned as [`SyncError::Rejected`] |
//! | validation rejection | counted; after [`MAX_CONSECUTIVE_REJECTIONS`] publishing stops for good |
//! | transport failure or timeout | logged, message dropped |

mod http;
mod log;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, trace, warn};

use crate::messages::Envelope;
use crate::{Result, SyncError};

pub use self::http::{HttpPublisher, TOKEN_HEADER};
pub use self::log::LogPublisher;

/// Consecutive validation rejections after which publishing is suppressed.
pub const MAX_CONSECUTIVE_REJECTIONS: u32 = 10;

/// Why the sink refused a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Credentials missing or not accepted
    Unauthorized(String),
    /// Client speaks a protocol version the sink does not
    VersionMismatch(String),
    /// The payload itself was invalid
    Invalid(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unauthorized(reason) => write!(f, "unauthorized: {reason}"),
            Rejection::VersionMismatch(reason) => write!(f, "protocol version mismatch: {reason}"),
            Rejection::Invalid(reason) => write!(f, "invalid payload: {reason}"),
        }
    }
}

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Accepted,
    Rejected(Rejection),
    /// Transport failure, the sink never answered
    Failed(String),
}

/// Capability to deliver one serialized message to the sink.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, body: &str) -> PublishOutcome;
}

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Accepted,
    Rejected,
    Failed,
    /// Publishing has been switched off after repeated rejections
    Suppressed,
}

/// Applies the failure policy around a [`Publisher`].
pub struct Dispatcher {
    publisher: Arc<dyn Publisher>,
    timeout: Duration,
    consecutive_rejections: u32,
    suppressed: bool,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .field("consecutive_rejections", &self.consecutive_rejections)
            .field("suppressed", &self.suppressed)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(publisher: Arc<dyn Publisher>, timeout: Duration) -> Self {
        Self { publisher, timeout, consecutive_rejections: 0, suppressed: false }
    }

    /// Publishing has been switched off for the rest of the process.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Publish one envelope.
    ///
    /// Only fatal rejections are returned as errors; everything else is
    /// logged with the message type and session key and reported as a
    /// [`Delivery`].
    pub async fn dispatch(&mut self, envelope: &Envelope) -> Result<Delivery> {
        let message_type = envelope.message_type;
        let session_key = envelope.session_id.as_str();

        if self.suppressed {
            trace!(%message_type, session_key, "Publishing suppressed, dropping message");
            return Ok(Delivery::Suppressed);
        }

        let body = match envelope.to_json() {
            Ok(body) => body,
            Err(e) => {
                warn!(%message_type, session_key, error = %e, "Unable to serialize message");
                return Ok(Delivery::Failed);
            }
        };

        let outcome = match tokio::time::timeout(self.timeout, self.publisher.publish(&body)).await {
            Ok(outcome) => outcome,
            Err(_) => PublishOutcome::Failed(format!("timed out after {:?}", self.timeout)),
        };

        match outcome {
            PublishOutcome::Accepted => {
                self.consecutive_rejections = 0;
                debug!(%message_type, session_key, "Message published");
                Ok(Delivery::Accepted)
            }
            PublishOutcome::Rejected(Rejection::Invalid(reason)) => {
                self.consecutive_rejections += 1;
                warn!(
                    %message_type,
                    session_key,
                    consecutive = self.consecutive_rejections,
                    %reason,
                    "Sink rejected message"
                );
                if self.consecutive_rejections >= MAX_CONSECUTIVE_REJECTIONS {
                    error!(
                        rejections = self.consecutive_rejections,
                        "Too many rejected messages, publishing disabled for this run"
                    );
                    self.suppressed = true;
                }
                Ok(Delivery::Rejected)
            }
            PublishOutcome::Rejected(rejection) => {
                error!(%message_type, session_key, %rejection, "Sink refused this client");
                Err(SyncError::Rejected {
                    rejection,
                    message_type: message_type.to_string(),
                    session_key: session_key.to_string(),
                })
            }
            PublishOutcome::Failed(reason) => {
                warn!(%message_type, session_key, %reason, "Unable to publish message");
                Ok(Delivery::Failed)
            }
        }
    }
}
