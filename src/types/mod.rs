//! Core value types shared by the trackers, the message payloads and the store.
//!
//! - [`DayTime`] is the single time unit used for every persisted and published
//!   timestamp or duration (fraction of a day, 1.0 == 86 400 s)
//! - [`TrackLocation`] maps the simulator's per-car track surface enum
//! - [`BitField`] wraps the simulator's bitfield variables (session flags, pit
//!   service flags)
//! - [`irsdk_flags`] holds the flag constants and their wire names

mod bitfield;
pub mod irsdk_flags;
mod time;
mod track_location;

pub use bitfield::BitField;
pub use time::{DayTime, SECONDS_PER_DAY};
pub use track_location::TrackLocation;
