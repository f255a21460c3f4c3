//! Configuration file and command line.
//!
//! Settings come from a YAML file; the command line (or the matching
//! `PITSYNC_*` environment variables) overrides the file for the options it
//! exposes. Validation happens once, here, before anything is started.
//!
//! ```yaml
//! iracing_id: 123456
//! client_id: pitwall-laptop
//! post_url: https://example.com/api/publish
//! access_token: secret
//! state_dir: ./state
//! simulate: ./recordings/spa.jsonl
//! tick_interval_ms: 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::client::ClientSettings;
use crate::{Result, SyncError};

/// Command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "pitsync", version, about = "Synchronizes team race state from simulator telemetry")]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(long, short, env = "PITSYNC_CONFIG", default_value = "pitsync.yaml")]
    pub config: PathBuf,
    /// Replay a telemetry recording instead of the live simulator
    #[arg(long, env = "PITSYNC_SIMULATE")]
    pub simulate: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, env = "PITSYNC_DEBUG", default_value_t = false)]
    pub debug: bool,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// User id of the local user, required
    pub iracing_id: Option<i32>,
    /// Client identifier in envelopes, defaults to the user id
    pub client_id: Option<String>,
    /// Sink URL; messages are only logged when absent
    pub post_url: Option<String>,
    pub access_token: Option<String>,
    pub proxy: Option<String>,
    /// Directory for the file-backed store; in-memory when absent
    pub state_dir: Option<PathBuf>,
    /// Telemetry recording to replay
    pub simulate: Option<PathBuf>,
    pub tick_interval_ms: u64,
    pub publish_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub sync_interval_ticks: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iracing_id: None,
            client_id: None,
            post_url: None,
            access_token: None,
            proxy: None,
            state_dir: None,
            simulate: None,
            tick_interval_ms: 500,
            publish_timeout_secs: 10,
            store_timeout_secs: 5,
            sync_interval_ticks: 10,
            debug: false,
        }
    }
}

impl Config {
    /// Load the file named on the command line, apply overrides and validate.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = Self::load(&args.config)?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file without validating it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SyncError::file_error(path, e))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(text).map_err(|e| SyncError::config(e.to_string()))
    }

    /// Command line values win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(simulate) = &args.simulate {
            self.simulate = Some(simulate.clone());
        }
        self.debug |= args.debug;
    }

    pub fn validate(&self) -> Result<()> {
        if self.iracing_id.is_none() {
            return Err(SyncError::config("iracing_id is required"));
        }
        for (name, value) in [
            ("tick_interval_ms", self.tick_interval_ms),
            ("publish_timeout_secs", self.publish_timeout_secs),
            ("store_timeout_secs", self.store_timeout_secs),
            ("sync_interval_ticks", self.sync_interval_ticks),
        ] {
            if value == 0 {
                return Err(SyncError::config(format!("{name} must be positive")));
            }
        }
        if self.access_token.is_some() && self.post_url.is_none() {
            return Err(SyncError::config("access_token is set but post_url is missing"));
        }
        Ok(())
    }

    /// Settings for the tick loop.
    pub fn client_settings(&self) -> Result<ClientSettings> {
        let user_id = self.iracing_id.ok_or_else(|| SyncError::config("iracing_id is required"))?;
        let mut settings = ClientSettings::new(user_id);
        if let Some(client_id) = &self.client_id {
            settings.client_id = client_id.clone();
        }
        settings.tick_interval = Duration::from_millis(self.tick_interval_ms);
        settings.publish_timeout = self.publish_timeout();
        settings.store_timeout = Duration::from_secs(self.store_timeout_secs);
        settings.sync_interval_ticks = self.sync_interval_ticks;
        Ok(settings)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}
