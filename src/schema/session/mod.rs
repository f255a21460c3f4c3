//! # Session Information Parsing
//!
//! Parsing of the simulator's session string: track identity, the session
//! list with lap/time limits, and the driver table used to resolve who is in
//! the car.
//!
//! ## iRacing YAML Compatibility
//!
//! iRacing outputs invalid YAML containing unescaped characters in driver and
//! team names that break standard YAML parsers. [`SessionInfoParser`] quotes
//! those values before parsing:
//!
//! ```text
//! // Problematic iRacing YAML:
//! UserName: O'Connor, Mike
//! TeamName: "Fast & Furious" Racing
//!
//! // After preprocessing:
//! UserName: 'O''Connor, Mike'
//! TeamName: '"Fast & Furious" Racing'
//! ```

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod driver;
pub mod session_data;
pub mod weekend;

pub use cache::SessionInfoParser;
pub use driver::{Driver, DriverInfoData};
pub use session_data::{Session, SessionInfoData};
pub use weekend::WeekendInfo;

/// Session information parsed from iRacing's YAML session string
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfo {
    /// Weekend and track information
    #[serde(default)]
    pub weekend_info: WeekendInfo,
    /// Session information and session list
    #[serde(default)]
    pub session_info: SessionInfoData,
    /// Driver information (current car + drivers list)
    #[serde(default)]
    pub driver_info: Option<DriverInfoData>,
}

impl SessionInfo {
    /// Parse cleaned YAML into SessionInfo
    ///
    /// The YAML should already be preprocessed; see [`SessionInfoParser::parse`]
    /// for the variant that cleans raw simulator output first.
    pub fn parse(yaml: &str) -> crate::Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| crate::SyncError::parse("SessionInfo deserialization", e.to_string()))
    }
}
