//! BitField type for handling iRacing bitfield variables

use serde::{Deserialize, Serialize};

use super::irsdk_flags::{pit_service, session_flags};

/// BitField type for handling iRacing bitfield variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitField(pub u32);

impl BitField {
    /// Create a new BitField from a u32 value.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Check if a specific flag is set using a bitmask.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Get the raw u32 value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Names of the session flags set in this field, in bit order.
    pub fn session_flag_names(&self) -> Vec<&'static str> {
        Self::names(self.0, session_flags::NAMES)
    }

    /// Names of the pit services requested in this field, in bit order.
    pub fn pit_service_names(&self) -> Vec<&'static str> {
        Self::names(self.0, pit_service::NAMES)
    }

    fn names(bits: u32, table: &[(u32, &'static str)]) -> Vec<&'static str> {
        table.iter().filter(|(flag, _)| bits & flag != 0).map(|(_, name)| *name).collect()
    }
}
