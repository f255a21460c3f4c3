//! Simulator session string
//!
//! The simulator publishes a YAML document alongside the per-tick variables.
//! It carries everything that changes rarely: track, session list, driver
//! table. This module parses the subset the synchronizer reads.

pub mod session;

pub use session::{SessionInfo, SessionInfoParser};
