//! Error types for the synchronizer.
//!
//! All errors implement `std::error::Error` and carry enough context (message
//! type, session key, document name) to correlate a local log line with the
//! server side.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Missing or invalid settings, detected once at startup
//! - **Telemetry Errors**: Unparseable recordings, missing snapshot fields
//! - **Transport Errors**: Publish timeouts, connection failures, sink rejections
//! - **Store Errors**: Persistence read/write failures
//!
//! ## Fatal vs. Recoverable
//!
//! Only sink rejections for authorization or protocol version are fatal. Every
//! other error is logged by the tick loop and the next tick proceeds:
//!
//! ```rust
//! use pitsync::{Rejection, SyncError};
//!
//! let error = SyncError::transport("connection reset");
//! assert!(error.is_retryable());
//! assert!(!error.is_fatal());
//!
//! let rejected = SyncError::Rejected {
//!     rejection: Rejection::Unauthorized("bad token".to_string()),
//!     message_type: "lapdata".to_string(),
//!     session_key: "Team@1#2#0".to_string(),
//! };
//! assert!(rejected.is_fatal());
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::publish::Rejection;

/// Result type alias for synchronizer operations.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Main error type for synchronizer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Field '{field}' not found in telemetry snapshot")]
    FieldNotFound { field: String },

    #[error("{operation} timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Sink rejected {message_type} for {session_key}: {rejection}")]
    Rejected { rejection: Rejection, message_type: String, session_key: String },

    #[error("Store error for '{key}': {reason}")]
    Store {
        key: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Returns whether the next tick may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Timeout { .. } => true,
            SyncError::Transport { .. } => true,
            SyncError::Store { .. } => true,
            SyncError::Rejected { .. } => false,
            SyncError::Config { .. } => false,
            SyncError::File { .. } => false,
            SyncError::Parse { .. } => false,
            SyncError::FieldNotFound { .. } => false,
            SyncError::Serialization(_) => false,
        }
    }

    /// Returns whether the process must terminate.
    ///
    /// Authorization and protocol-version rejections cannot be fixed by
    /// publishing again, so continuing would only flood the sink.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Rejected {
                rejection: Rejection::Unauthorized(_) | Rejection::VersionMismatch(_),
                ..
            }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SyncError::Config { .. } => vec![
                "Check the configuration file path",
                "Verify that iracing_id is set",
                "Check tick and timeout values are positive",
            ],
            SyncError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Ensure sufficient disk space",
            ],
            SyncError::Parse { .. } => vec![
                "Verify the telemetry recording is not truncated",
                "Check the session string comes from a supported simulator version",
            ],
            SyncError::FieldNotFound { .. } => vec![
                "Verify the driver car index is present in the driver table",
                "Check the recording contains per-car arrays",
            ],
            SyncError::Timeout { .. } => vec![
                "Check network connectivity to the sink",
                "Increase publish_timeout_secs or store_timeout_secs",
            ],
            SyncError::Transport { .. } => vec![
                "Check the configured post_url",
                "Check proxy settings",
                "Verify the sink is reachable",
            ],
            SyncError::Rejected { .. } => vec![
                "Verify the access token",
                "Update the client to the protocol version the sink expects",
            ],
            SyncError::Store { .. } => vec![
                "Check state_dir exists and is writable",
                "Remove corrupted state documents",
            ],
            SyncError::Serialization(_) => vec!["Report the payload that failed to serialize"],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        SyncError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::File { path: path.into(), source }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        SyncError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for transport errors.
    pub fn transport(reason: impl Into<String>) -> Self {
        SyncError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SyncError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for store errors.
    pub fn store(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::Store { key: key.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for store errors with source.
    pub fn store_with_source(
        key: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SyncError::Store { key: key.into(), reason: reason.into(), source: Some(source) }
    }
}
